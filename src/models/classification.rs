// Data models for the remote classifier exchange, recognition events and errors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// Wire types
// ==============================================================================

/// Body returned by `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Error {
        error: String,
    },
    Prediction {
        #[serde(default)]
        prediction: String,
        confidence: f32,
    },
}

/// Body returned by `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "ok" && self.model_loaded
    }
}

// ==============================================================================
// Results
// ==============================================================================

/// A well-formed classifier answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// How a well-formed prediction was judged against the confidence threshold
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    Accepted(Prediction),
    LowConfidence(Prediction),
}

impl ClassificationOutcome {
    /// Accept only predictions strictly above `threshold`
    pub fn judge(prediction: Prediction, threshold: f32) -> Self {
        if prediction.confidence > threshold {
            ClassificationOutcome::Accepted(prediction)
        } else {
            ClassificationOutcome::LowConfidence(prediction)
        }
    }
}

/// An accepted classification, as delivered to listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub label: String,
    pub confidence: f32,
    pub recognized_at: DateTime<Utc>,
}

/// Continuously recomputed session telemetry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub hand_detected: bool,
    pub fps: u32,
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("Initialization failed: {0}")]
    InitializationFailure(String),

    #[error("Classifier request failed: {0}")]
    TransportFailure(String),

    #[error("Classifier reported an error: {0}")]
    ServiceError(String),

    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),

    #[error("Landmark set is empty")]
    EmptyLandmarkSet,

    #[error("Expected 21 landmarks, got {0}")]
    InvalidLandmarkCount(usize),

    #[error("Landmark {index} out of range: ({x}, {y})")]
    InvalidLandmark { index: usize, x: f32, y: f32 },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid image dimensions: expected {expected:?}, got {actual:?}")]
    InvalidDimensions {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Recognition session is not running")]
    NotRunning,

    #[error("Recognition session already running")]
    AlreadyRunning,
}

pub type RecognizerResult<T> = Result<T, RecognizerError>;

impl From<reqwest::Error> for RecognizerError {
    fn from(err: reqwest::Error) -> Self {
        RecognizerError::TransportFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_response_parsing() {
        let ok: PredictResponse =
            serde_json::from_str(r#"{"prediction": "A", "confidence": 0.93}"#).unwrap();
        assert_eq!(
            ok,
            PredictResponse::Prediction {
                prediction: "A".to_string(),
                confidence: 0.93
            }
        );

        let err: PredictResponse =
            serde_json::from_str(r#"{"error": "model unavailable"}"#).unwrap();
        assert_eq!(
            err,
            PredictResponse::Error {
                error: "model unavailable".to_string()
            }
        );

        let bare: PredictResponse = serde_json::from_str(r#"{"confidence": 0.49}"#).unwrap();
        assert!(matches!(bare, PredictResponse::Prediction { confidence, .. } if confidence == 0.49));

        assert!(serde_json::from_str::<PredictResponse>(r#"{"status": "ok"}"#).is_err());
    }

    #[test]
    fn test_confidence_threshold_is_strict() {
        let at = Prediction { label: "B".to_string(), confidence: 0.5 };
        assert!(matches!(
            ClassificationOutcome::judge(at, 0.5),
            ClassificationOutcome::LowConfidence(_)
        ));

        let above = Prediction { label: "B".to_string(), confidence: 0.51 };
        assert!(matches!(
            ClassificationOutcome::judge(above, 0.5),
            ClassificationOutcome::Accepted(_)
        ));
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "ok", "model_loaded": true}"#).unwrap();
        assert!(health.is_ready());

        let health: HealthStatus = serde_json::from_str(r#"{"status": "loading"}"#).unwrap();
        assert!(!health.is_ready());
    }
}
