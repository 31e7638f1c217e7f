use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::fallback::FallbackModel;
use crate::risk::RiskThresholds;

pub const DEFAULT_SCORING_URL: &str = "http://127.0.0.1:5000/api/predict";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Endpoint receiving the feature record (POST, JSON).
    pub url: String,
    /// After this many seconds the remote attempt counts as failed.
    pub timeout_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SCORING_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ScoringConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub scoring: ScoringConfig,
    pub fallback: FallbackModel,
    pub thresholds: RiskThresholds,
}

impl PredictorConfig {
    /// Reads a JSON config file, or the built-in defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        anyhow::ensure!(
            config.thresholds.medium <= config.thresholds.high,
            "medium threshold {} exceeds high threshold {}",
            config.thresholds.medium,
            config.thresholds.high
        );
        Ok(config)
    }

    pub fn with_overrides(mut self, url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = url {
            self.scoring.url = url;
        }
        if let Some(secs) = timeout_secs {
            self.scoring.timeout_secs = secs;
        }
        self
    }
}
