// src/errors.rs
use crate::models::AttemptFailure;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrandforgeError {
    #[error("API credential missing: set the {0} environment variable")]
    MissingCredential(&'static str),

    #[error("{message}")]
    BatchGeneration { message: String, rate_limited: bool },

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl BrandforgeError {
    /// Aggregate error for a batch where no attempt produced an image.
    /// Rate-limited batches get distinct wording so the UI can tell the user
    /// to retry shortly instead of showing a generic failure.
    pub fn batch_failed(failures: &[AttemptFailure]) -> Self {
        let rate_limited = failures.iter().any(|f| f.is_rate_limited());
        let reasons = failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let message = if rate_limited {
            format!(
                "The image service is busy (rate limit or quota exceeded). \
                 Please try again shortly. {} attempt(s) failed: {}",
                failures.len(),
                reasons
            )
        } else {
            format!(
                "Failed to generate logos. {} attempt(s) failed: {}",
                failures.len(),
                reasons
            )
        };

        BrandforgeError::BatchGeneration {
            message,
            rate_limited,
        }
    }
}

impl ResponseError for BrandforgeError {
    fn error_response(&self) -> HttpResponse {
        match self {
            BrandforgeError::MissingCredential(_) => {
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "Service not configured",
                    "message": self.to_string()
                }))
            }
            BrandforgeError::BatchGeneration { rate_limited, .. } => {
                if *rate_limited {
                    HttpResponse::TooManyRequests().json(serde_json::json!({
                        "error": "Image service busy",
                        "message": self.to_string()
                    }))
                } else {
                    HttpResponse::BadGateway().json(serde_json::json!({
                        "error": "Generation failed",
                        "message": self.to_string()
                    }))
                }
            }
            BrandforgeError::Redis(_) => HttpResponse::InternalServerError().json(
                serde_json::json!({
                    "error": "Storage error",
                    "message": self.to_string()
                }),
            ),
            BrandforgeError::ImageProcessing(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Image processing error",
                    "message": self.to_string()
                }))
            }
            BrandforgeError::Serialization(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Data processing error",
                    "message": self.to_string()
                }))
            }
            BrandforgeError::Validation(_) => HttpResponse::BadRequest().json(
                serde_json::json!({
                    "error": "Validation error",
                    "message": self.to_string()
                }),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FailureKind;

    #[test]
    fn test_batch_failed_counts_failures() {
        let failures = vec![
            AttemptFailure::new(FailureKind::NoImageData, "no image data in response"),
            AttemptFailure::new(FailureKind::Transport, "connection reset"),
        ];
        let err = BrandforgeError::batch_failed(&failures);
        let message = err.to_string();
        assert!(message.contains("2 attempt(s) failed"));
        assert!(message.contains("no image data in response"));
        assert!(message.contains("connection reset"));
    }

    #[test]
    fn test_batch_failed_rate_limited_wording() {
        let failures = vec![
            AttemptFailure::new(FailureKind::RateLimited, "HTTP 429: quota exceeded"),
            AttemptFailure::new(FailureKind::Transport, "timeout"),
        ];
        let err = BrandforgeError::batch_failed(&failures);
        match &err {
            BrandforgeError::BatchGeneration { rate_limited, .. } => assert!(rate_limited),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("busy"));
        assert!(err.to_string().contains("try again shortly"));
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = BrandforgeError::MissingCredential("GEMINI_API_KEY");
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
