// Classification client - request/response exchange with the remote classifier

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::config::RecognizerConfig;
use super::tensor::NormalizedTensor;
use crate::models::classification::{
    HealthStatus, PredictResponse, Prediction, RecognizerError, RecognizerResult,
};

/// Remote classification capability
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one normalized hand image.
    ///
    /// An explicit error from the service is `ServiceError`; a failed or
    /// timed-out request is `TransportFailure`.
    async fn classify(&self, tensor: &NormalizedTensor) -> RecognizerResult<Prediction>;

    /// Query service readiness
    async fn health(&self) -> RecognizerResult<HealthStatus>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    image: &'a NormalizedTensor,
}

/// HTTP/JSON client for the classification service
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RecognizerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecognizerError::InitializationFailure(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &RecognizerConfig) -> RecognizerResult<Self> {
        Self::new(config.server_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Interpret a `/predict` reply.
///
/// The service sends `{"error": ...}` bodies with 4xx/5xx statuses, so the body
/// is parsed before the status is considered.
pub fn interpret_response(status: reqwest::StatusCode, body: &str) -> RecognizerResult<Prediction> {
    match serde_json::from_str::<PredictResponse>(body) {
        Ok(PredictResponse::Error { error }) => Err(RecognizerError::ServiceError(error)),
        Ok(PredictResponse::Prediction { prediction, confidence }) => {
            if !status.is_success() {
                return Err(RecognizerError::ServiceError(format!(
                    "HTTP {} with prediction body",
                    status
                )));
            }
            if !confidence.is_finite() {
                return Err(RecognizerError::InvalidResponse(format!(
                    "non-finite confidence {}",
                    confidence
                )));
            }
            Ok(Prediction {
                label: prediction,
                confidence,
            })
        }
        Err(_) if !status.is_success() => Err(RecognizerError::ServiceError(format!("HTTP {}", status))),
        Err(e) => Err(RecognizerError::InvalidResponse(e.to_string())),
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, tensor: &NormalizedTensor) -> RecognizerResult<Prediction> {
        let start_time = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint("/predict"))
            .json(&PredictRequest { image: tensor })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            status = status.as_u16(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "classifier responded"
        );

        interpret_response(status, &body)
    }

    async fn health(&self) -> RecognizerResult<HealthStatus> {
        let response = self.client.get(self.endpoint("/health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RecognizerError::ServiceError(format!("HTTP {}", status)));
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| RecognizerError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::region_sampler::SampledImage;
    use image::{Rgba, RgbaImage};
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_tensor() -> NormalizedTensor {
        let image = RgbaImage::from_pixel(128, 128, Rgba([255, 0, 51, 255]));
        NormalizedTensor::from_image(&SampledImage::try_from(image).unwrap())
    }

    /// Serve a single canned HTTP response and hand back the raw request
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 64 * 1024];

            // Read headers, then the declared body length
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_interpret_prediction() {
        let prediction =
            interpret_response(StatusCode::OK, r#"{"prediction": "C", "confidence": 0.87}"#).unwrap();
        assert_eq!(prediction.label, "C");
        assert!((prediction.confidence - 0.87).abs() < 1e-6);
    }

    #[test]
    fn test_interpret_error_body() {
        let result = interpret_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "model unavailable"}"#,
        );
        assert!(matches!(result, Err(RecognizerError::ServiceError(msg)) if msg == "model unavailable"));

        let result = interpret_response(StatusCode::OK, r#"{"error": "bad shape"}"#);
        assert!(matches!(result, Err(RecognizerError::ServiceError(_))));
    }

    #[test]
    fn test_interpret_malformed_body() {
        let result = interpret_response(StatusCode::OK, "<html>oops</html>");
        assert!(matches!(result, Err(RecognizerError::InvalidResponse(_))));

        let result = interpret_response(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(matches!(result, Err(RecognizerError::ServiceError(_))));
    }

    #[tokio::test]
    async fn test_classify_posts_tensor() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"prediction": "A", "confidence": 0.91}"#).await;
        let classifier = HttpClassifier::new(url, Duration::from_secs(5)).unwrap();

        let prediction = classifier.classify(&test_tensor()).await.unwrap();
        assert_eq!(prediction.label, "A");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /predict"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        let image = json["image"].as_array().unwrap();
        assert_eq!(image.len(), 128);
        assert_eq!(image[0].as_array().unwrap().len(), 128);
        assert_eq!(image[5][9][0].as_f64().unwrap(), 1.0);
        assert_eq!(image[5][9][1].as_f64().unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_classify_service_error() {
        let (url, _server) =
            serve_once("HTTP/1.1 500 Internal Server Error", r#"{"error": "model unavailable"}"#).await;
        let classifier = HttpClassifier::new(url, Duration::from_secs(5)).unwrap();

        let result = classifier.classify(&test_tensor()).await;
        assert!(matches!(result, Err(RecognizerError::ServiceError(_))));
    }

    #[tokio::test]
    async fn test_classify_transport_failure() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let classifier = HttpClassifier::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let result = classifier.classify(&test_tensor()).await;
        assert!(matches!(result, Err(RecognizerError::TransportFailure(_))));
    }

    #[tokio::test]
    async fn test_health() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"status": "ok", "model_loaded": true}"#).await;
        let classifier = HttpClassifier::new(format!("{}/", url), Duration::from_secs(5)).unwrap();

        let health = classifier.health().await.unwrap();
        assert!(health.is_ready());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /health"));
    }
}
