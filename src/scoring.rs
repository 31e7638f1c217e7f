//! Client for the remote GPA scoring service.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::models::FeatureRecord;

/// A successful answer from the scoring service.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPrediction {
    pub gpa: f64,
    pub suggestions: Option<Vec<String>>,
}

pub trait ScoringService {
    async fn score(&self, features: &FeatureRecord) -> Result<ScoredPrediction, TransportError>;
}

/// Used with `--offline`: every attempt fails so the fallback always runs.
pub struct Offline;

impl ScoringService for Offline {
    async fn score(&self, _features: &FeatureRecord) -> Result<ScoredPrediction, TransportError> {
        Err(TransportError::Disabled)
    }
}

pub struct HttpScoringService {
    url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl HttpScoringService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            url: url.into(),
            timeout,
            agent,
        }
    }

    fn post_blocking(agent: &ureq::Agent, url: &str, body: Value) -> Result<ScoredPrediction, TransportError> {
        let response = agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_json(body);

        match response {
            Ok(resp) => {
                let status = resp.status();
                let text = resp
                    .into_string()
                    .map_err(|e| TransportError::Network(format!("failed to read body: {e}")))?;
                interpret_response(status, &text)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                interpret_response(code, &text)
            }
            Err(e) => Err(TransportError::Network(e.to_string())),
        }
    }
}

impl ScoringService for HttpScoringService {
    async fn score(&self, features: &FeatureRecord) -> Result<ScoredPrediction, TransportError> {
        let body = serde_json::to_value(features)
            .map_err(|e| TransportError::InvalidBody(format!("failed to encode features: {e}")))?;
        let agent = self.agent.clone();
        let url = self.url.clone();

        debug!(url = %self.url, "posting feature record");
        let call = tokio::task::spawn_blocking(move || Self::post_blocking(&agent, &url, body));

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(TransportError::Network(format!("request task failed: {join}"))),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }
}

/// Maps a status code and raw body to a prediction or a transport failure.
pub fn interpret_response(status: u16, body: &str) -> Result<ScoredPrediction, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::Status(error_message(status, body)));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| TransportError::InvalidBody(e.to_string()))?;

    let gpa = match value.get("predicted_gpa") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|gpa| gpa.is_finite())
    .ok_or_else(|| TransportError::InvalidBody("missing numeric predicted_gpa".to_string()))?;

    let suggestions = value.get("suggestions").and_then(|raw| {
        raw.as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
    });

    Ok(ScoredPrediction { gpa, suggestions })
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("error").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => value.to_string(),
        },
        Err(_) => format!("HTTP {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use crate::features::build_features;
    use crate::models::{ExamPreparation, RawInput, StudyMaterials};

    fn sample_features() -> FeatureRecord {
        build_features(&RawInput {
            age: 18,
            study_hours_per_day: 1.0,
            waec_grades: vec![4],
            exam_preparation: ExamPreparation::default(),
            study_materials: StudyMaterials::default(),
        })
        .unwrap()
    }

    /// Accepts one connection, reads the full request, and replies with `status` and `body`.
    fn serve_once(status: &'static str, body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/predict", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (url, handle)
    }

    #[test]
    fn success_body_with_suggestions() {
        let scored = interpret_response(200, r#"{"predicted_gpa": 3.12, "suggestions": ["a", "b"]}"#).unwrap();
        assert_eq!(scored.gpa, 3.12);
        assert_eq!(scored.suggestions, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn success_body_without_usable_suggestions() {
        let scored = interpret_response(200, r#"{"predicted_gpa": 4.2}"#).unwrap();
        assert_eq!(scored.suggestions, None);
        let scored = interpret_response(200, r#"{"predicted_gpa": "2.7", "suggestions": [1, 2]}"#).unwrap();
        assert_eq!(scored.gpa, 2.7);
        assert_eq!(scored.suggestions, None);
    }

    #[test]
    fn unusable_success_bodies_are_failures() {
        assert!(matches!(interpret_response(200, "not json"), Err(TransportError::InvalidBody(_))));
        assert!(matches!(interpret_response(200, r#"{"gpa": 3.0}"#), Err(TransportError::InvalidBody(_))));
        assert!(matches!(
            interpret_response(200, r#"{"predicted_gpa": "high"}"#),
            Err(TransportError::InvalidBody(_))
        ));
    }

    #[test]
    fn error_status_prefers_error_field() {
        assert_eq!(
            interpret_response(400, r#"{"error": "No input data provided"}"#),
            Err(TransportError::Status("No input data provided".to_string()))
        );
        assert_eq!(
            interpret_response(500, r#"{"detail": "boom"}"#),
            Err(TransportError::Status(r#"{"detail":"boom"}"#.to_string()))
        );
        assert_eq!(
            interpret_response(502, "<html>Bad Gateway</html>"),
            Err(TransportError::Status("HTTP 502".to_string()))
        );
    }

    #[tokio::test]
    async fn posts_feature_record_and_reads_prediction() {
        let (url, server) = serve_once("200 OK", r#"{"predicted_gpa": 4.2}"#);
        let client = HttpScoringService::new(url, Duration::from_secs(5));
        let scored = client.score(&sample_features()).await.unwrap();
        assert_eq!(scored.gpa, 4.2);
        assert_eq!(scored.suggestions, None);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/predict"));
        assert!(request.contains("\"WAEC_Average\":4.0"));
        assert!(request.contains("\"First_Year_GPA_Average_minmax\":0.0"));
    }

    #[tokio::test]
    async fn error_status_becomes_transport_error() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error": "model not loaded"}"#);
        let client = HttpScoringService::new(url, Duration::from_secs(5));
        let result = client.score(&sample_features()).await;
        assert_eq!(result, Err(TransportError::Status("model not loaded".to_string())));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HttpScoringService::new(format!("http://127.0.0.1:{port}/api/predict"), Duration::from_secs(2));
        let result = client.score(&sample_features()).await;
        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn silent_service_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/predict", listener.local_addr().unwrap());
        let client = HttpScoringService::new(url, Duration::from_millis(300));
        let result = client.score(&sample_features()).await;
        assert!(matches!(result, Err(TransportError::Timeout(_)) | Err(TransportError::Network(_))));
        drop(listener);
    }

    #[tokio::test]
    async fn offline_service_always_fails() {
        assert_eq!(Offline.score(&sample_features()).await, Err(TransportError::Disabled));
    }
}
