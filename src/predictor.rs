//! Runs one questionnaire submission through to a classified result.

use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::config::PredictorConfig;
use crate::error::{TransportError, ValidationError};
use crate::features::build_features;
use crate::models::{FeatureRecord, PredictionResult, PredictionSource, RawInput, StudentSession};
use crate::scoring::{ScoredPrediction, ScoringService};
use crate::suggestions::suggestions_for;

/// Outcome of the single remote attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Remote(ScoredPrediction),
    Fallback { gpa: f64, cause: TransportError },
}

pub struct Predictor<S> {
    service: S,
    config: PredictorConfig,
}

impl<S: ScoringService> Predictor<S> {
    pub fn new(service: S, config: PredictorConfig) -> Self {
        Self { service, config }
    }

    /// Validates, scores and classifies one submission.
    ///
    /// Only validation can fail; transport problems resolve through the fallback.
    pub async fn submit(
        &self,
        session: &StudentSession,
        input: &RawInput,
    ) -> Result<PredictionResult, ValidationError> {
        let span = tracing::info_span!("submission", submission = %Uuid::new_v4(), student = session.label());

        async move {
            let features = build_features(input).inspect_err(|e| {
                info!(error = %e, "submission rejected");
            })?;
            let result = self.finish(self.resolve(&features).await);
            info!(gpa = result.gpa, risk = %result.risk, source = ?result.source, "submission resolved");
            Ok(result)
        }
        .instrument(span)
        .await
    }

    pub async fn resolve(&self, features: &FeatureRecord) -> Resolution {
        match self.service.score(features).await {
            Ok(scored) => Resolution::Remote(scored),
            Err(cause) => {
                warn!(error = %cause, "scoring service unavailable, using local fallback");
                Resolution::Fallback {
                    gpa: self.config.fallback.predict(features),
                    cause,
                }
            }
        }
    }

    pub fn finish(&self, resolution: Resolution) -> PredictionResult {
        let thresholds = &self.config.thresholds;
        let (gpa, suggestions, source) = match resolution {
            Resolution::Remote(ScoredPrediction { gpa, suggestions }) => {
                let suggestions = suggestions.unwrap_or_else(|| suggestions_for(thresholds, gpa));
                (gpa, suggestions, PredictionSource::Remote)
            }
            Resolution::Fallback { gpa, .. } => {
                (gpa, suggestions_for(thresholds, gpa), PredictionSource::Fallback)
            }
        };

        PredictionResult {
            gpa,
            risk: thresholds.classify(gpa),
            suggestions,
            source,
        }
    }
}
