// src/services/generator.rs
//
// Batch orchestration for logo generation: one user action fans out into
// N sequential attempts against the image-generation capability. Attempts
// fail independently; a rate-limited attempt aborts the rest of the batch.
use crate::errors::BrandforgeError;
use crate::models::*;
use crate::services::prompt;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use log::{info, warn};
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;

/// Number of variations generated per batch.
pub const DEFAULT_VARIATIONS: usize = 4;

/// Transport-level failure reported by an image-generation capability.
#[derive(Debug)]
pub enum CapabilityError {
    Http { status: u16, body: String },
    Network(String),
    Decode(String),
}

/// The external image-generation service, seen as an opaque capability:
/// submit one prompt + config, get back the raw response document.
#[async_trait]
pub trait ImageGenCapability: Send + Sync {
    /// Checks the backing credential is configured. Called once per batch,
    /// before any attempt is issued.
    fn ensure_ready(&self) -> Result<(), BrandforgeError>;

    async fn generate(&self, request: &GenerationRequest) -> Result<Value, CapabilityError>;
}

pub struct LogoGenerator {
    capability: Arc<dyn ImageGenCapability>,
    variations: usize,
}

impl LogoGenerator {
    pub fn new(capability: Arc<dyn ImageGenCapability>) -> Self {
        Self {
            capability,
            variations: DEFAULT_VARIATIONS,
        }
    }

    #[cfg(test)]
    pub fn with_variations(mut self, variations: usize) -> Self {
        self.variations = variations;
        self
    }

    /// Runs one batch for the given brief.
    ///
    /// Attempts run sequentially, one request per variation, no retries. A
    /// failed attempt is recorded and the batch moves on, except when the
    /// failure is classified as rate limiting: further attempts would only
    /// burn quota, so the batch stops issuing them. Partial success is
    /// success; the error path is reserved for batches with zero images.
    pub async fn generate_batch(&self, brief: &BrandBrief) -> Result<BatchResult, BrandforgeError> {
        self.capability.ensure_ready()?;

        let base = prompt::base_prompt(brief);
        let mut images = Vec::new();
        let mut failures = Vec::new();

        for index in 0..self.variations {
            let request = GenerationRequest {
                system_instruction: prompt::system_instruction().to_string(),
                user_prompt: prompt::variation_prompt(&base, index, self.variations),
                seed: derive_seed(index),
                variation_index: index,
                reference_image: brief.reference_image.clone(),
            };

            match self.attempt(&request).await {
                Ok(image) => images.push(image),
                Err(failure) => {
                    warn!(
                        "logo attempt {}/{} failed ({:?}): {}",
                        index + 1,
                        self.variations,
                        failure.kind,
                        failure.message
                    );
                    let rate_limited = failure.is_rate_limited();
                    failures.push(failure);
                    if rate_limited {
                        warn!("rate limit detected, aborting remaining attempts");
                        break;
                    }
                }
            }
        }

        if images.is_empty() {
            return Err(BrandforgeError::batch_failed(&failures));
        }

        info!(
            "generated {}/{} logo variations ({} failed)",
            images.len(),
            self.variations,
            failures.len()
        );
        Ok(BatchResult { images, failures })
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<LogoImage, AttemptFailure> {
        let response = self
            .capability
            .generate(request)
            .await
            .map_err(classify_capability_error)?;
        extract_image(&response)
    }
}

/// Seed for one attempt: a fresh pseudo-random integer offset by the
/// variation index so repeated runs stay statistically distinct. Only used
/// to bias the model toward different outputs; not security-relevant.
fn derive_seed(index: usize) -> i64 {
    rand::thread_rng().gen_range(0..1_000_000) + index as i64
}

/// Pulls the first inline image out of a generateContent-style response:
/// first candidate, first part carrying inline data with a decodable payload.
pub fn extract_image(response: &Value) -> Result<LogoImage, AttemptFailure> {
    let candidates = response["candidates"].as_array();
    let candidates = match candidates {
        Some(c) if !c.is_empty() => c,
        _ => {
            return Err(AttemptFailure::new(
                FailureKind::EmptyResponse,
                "no candidates returned from the image service",
            ));
        }
    };

    let parts = match candidates[0]["content"]["parts"].as_array() {
        Some(p) if !p.is_empty() => p,
        _ => {
            return Err(AttemptFailure::new(
                FailureKind::EmptyResponse,
                "no content parts returned from the image service",
            ));
        }
    };

    for part in parts {
        if let Some(data) = part["inlineData"]["data"].as_str() {
            let mime_type = part["inlineData"]["mimeType"]
                .as_str()
                .unwrap_or("image/png")
                .to_string();
            let bytes = general_purpose::STANDARD.decode(data).map_err(|e| {
                AttemptFailure::new(
                    FailureKind::NoImageData,
                    format!("image payload is not valid base64: {}", e),
                )
            })?;
            return Ok(LogoImage {
                mime_type,
                data: bytes,
            });
        }
    }

    Err(AttemptFailure::new(
        FailureKind::NoImageData,
        "no image data found in the response",
    ))
}

/// Maps a capability error to a per-attempt failure.
///
/// Rate-limit detection is a best-effort heuristic: the upstream service does
/// not guarantee a typed error, so an HTTP 429 or a quota/rate-limit marker
/// in the message is treated as the signal. Kept in one place so the
/// heuristic can change without touching orchestration.
pub fn classify_capability_error(err: CapabilityError) -> AttemptFailure {
    match err {
        CapabilityError::Http { status, body } => {
            let message = format!("HTTP {}: {}", status, body);
            if is_rate_limit_signal(Some(status), &body) {
                AttemptFailure::new(FailureKind::RateLimited, message)
            } else {
                AttemptFailure::new(FailureKind::Transport, message)
            }
        }
        CapabilityError::Network(message) => {
            if is_rate_limit_signal(None, &message) {
                AttemptFailure::new(FailureKind::RateLimited, message)
            } else {
                AttemptFailure::new(FailureKind::Transport, message)
            }
        }
        CapabilityError::Decode(message) => AttemptFailure::new(
            FailureKind::Unknown,
            format!("unreadable response from the image service: {}", message),
        ),
    }
}

fn is_rate_limit_signal(status: Option<u16>, message: &str) -> bool {
    if status == Some(429) {
        return true;
    }
    let lower = message.to_lowercase();
    lower.contains("quota") || lower.contains("rate limit") || lower.contains("resource_exhausted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedCapability {
        ready: bool,
        responses: Mutex<VecDeque<Result<Value, CapabilityError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedCapability {
        fn new(responses: Vec<Result<Value, CapabilityError>>) -> Arc<Self> {
            Arc::new(Self {
                ready: true,
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn without_credential() -> Arc<Self> {
            Arc::new(Self {
                ready: false,
                responses: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageGenCapability for ScriptedCapability {
        fn ensure_ready(&self) -> Result<(), BrandforgeError> {
            if self.ready {
                Ok(())
            } else {
                Err(BrandforgeError::MissingCredential("GEMINI_API_KEY"))
            }
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<Value, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted capability ran out of responses")
        }
    }

    fn image_response() -> Value {
        json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your logo." },
                        {
                            "inlineData": {
                                "mimeType": "image/png",
                                "data": general_purpose::STANDARD.encode(b"png bytes")
                            }
                        }
                    ]
                }
            }]
        })
    }

    fn text_only_response() -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": "sorry, no image" }] }
            }]
        })
    }

    fn brief() -> BrandBrief {
        BrandBrief {
            brand_name: "Apex Innovations".to_string(),
            industry: "Tech".to_string(),
            style: LogoStyle::Geometric,
            colors: "Navy (#1E3A8A) & Grey".to_string(),
            icon: None,
            reference_image: None,
        }
    }

    // --- extract_image ---

    #[test]
    fn test_extract_image_success() {
        let image = extract_image(&image_response()).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, b"png bytes");
    }

    #[test]
    fn test_extract_image_defaults_mime_type() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": { "data": general_purpose::STANDARD.encode(b"x") }
                    }]
                }
            }]
        });
        let image = extract_image(&response).unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_extract_image_no_candidates() {
        let failure = extract_image(&json!({ "candidates": [] })).unwrap_err();
        assert_eq!(failure.kind, FailureKind::EmptyResponse);

        let failure = extract_image(&json!({})).unwrap_err();
        assert_eq!(failure.kind, FailureKind::EmptyResponse);
    }

    #[test]
    fn test_extract_image_no_parts() {
        let response = json!({ "candidates": [{ "content": {} }] });
        let failure = extract_image(&response).unwrap_err();
        assert_eq!(failure.kind, FailureKind::EmptyResponse);
    }

    #[test]
    fn test_extract_image_text_only_is_no_image_data() {
        let failure = extract_image(&text_only_response()).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NoImageData);
    }

    #[test]
    fn test_extract_image_invalid_base64() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "inlineData": { "mimeType": "image/png", "data": "!!!" } }]
                }
            }]
        });
        let failure = extract_image(&response).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NoImageData);
    }

    // --- classification ---

    #[test]
    fn test_classify_429_as_rate_limited() {
        let failure = classify_capability_error(CapabilityError::Http {
            status: 429,
            body: "too many requests".to_string(),
        });
        assert_eq!(failure.kind, FailureKind::RateLimited);
    }

    #[test]
    fn test_classify_quota_text_as_rate_limited() {
        let failure = classify_capability_error(CapabilityError::Http {
            status: 500,
            body: "Quota exceeded for this project".to_string(),
        });
        assert_eq!(failure.kind, FailureKind::RateLimited);

        let failure = classify_capability_error(CapabilityError::Http {
            status: 503,
            body: "RESOURCE_EXHAUSTED".to_string(),
        });
        assert_eq!(failure.kind, FailureKind::RateLimited);
    }

    #[test]
    fn test_classify_plain_http_as_transport() {
        let failure = classify_capability_error(CapabilityError::Http {
            status: 500,
            body: "internal error".to_string(),
        });
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(failure.message.contains("HTTP 500"));
    }

    #[test]
    fn test_classify_network_and_decode() {
        let failure =
            classify_capability_error(CapabilityError::Network("connection reset".to_string()));
        assert_eq!(failure.kind, FailureKind::Transport);

        let failure =
            classify_capability_error(CapabilityError::Decode("not json".to_string()));
        assert_eq!(failure.kind, FailureKind::Unknown);
    }

    // --- batch orchestration ---

    #[tokio::test]
    async fn test_partial_success_returns_successful_images() {
        let capability = ScriptedCapability::new(vec![
            Ok(text_only_response()),
            Ok(image_response()),
            Ok(text_only_response()),
            Ok(image_response()),
        ]);
        let generator = LogoGenerator::new(capability.clone());

        let result = generator.generate_batch(&brief()).await.unwrap();
        assert_eq!(result.images.len(), 2);
        assert_eq!(result.failures.len(), 2);
        assert_eq!(capability.call_count(), 4);
    }

    #[tokio::test]
    async fn test_all_failures_raises_aggregate_error() {
        let capability = ScriptedCapability::new(vec![
            Ok(text_only_response()),
            Ok(text_only_response()),
            Ok(text_only_response()),
            Ok(text_only_response()),
        ]);
        let generator = LogoGenerator::new(capability.clone());

        let err = generator.generate_batch(&brief()).await.unwrap_err();
        match &err {
            BrandforgeError::BatchGeneration { rate_limited, .. } => assert!(!rate_limited),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("4 attempt(s) failed"));
        assert_eq!(capability.call_count(), 4);
    }

    #[tokio::test]
    async fn test_rate_limited_batch_reports_busy() {
        let capability = ScriptedCapability::new(vec![Err(CapabilityError::Http {
            status: 429,
            body: "quota exceeded".to_string(),
        })]);
        let generator = LogoGenerator::new(capability.clone());

        let err = generator.generate_batch(&brief()).await.unwrap_err();
        assert!(err.to_string().contains("busy"));
        // Early abort: the remaining three attempts are never issued.
        assert_eq!(capability.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_aborts_after_partial_success() {
        let capability = ScriptedCapability::new(vec![
            Ok(image_response()),
            Err(CapabilityError::Http {
                status: 429,
                body: "rate limit".to_string(),
            }),
        ]);
        let generator = LogoGenerator::new(capability.clone());

        let result = generator.generate_batch(&brief()).await.unwrap();
        assert_eq!(result.images.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(capability.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_rate_limit_failures_do_not_abort() {
        let capability = ScriptedCapability::new(vec![
            Err(CapabilityError::Network("connection reset".to_string())),
            Err(CapabilityError::Http {
                status: 500,
                body: "internal".to_string(),
            }),
            Ok(image_response()),
            Ok(image_response()),
        ]);
        let generator = LogoGenerator::new(capability.clone());

        let result = generator.generate_batch(&brief()).await.unwrap();
        assert_eq!(result.images.len(), 2);
        assert_eq!(capability.call_count(), 4);
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let capability = ScriptedCapability::without_credential();
        let generator = LogoGenerator::new(capability.clone());

        let err = generator.generate_batch(&brief()).await.unwrap_err();
        assert!(matches!(err, BrandforgeError::MissingCredential(_)));
        assert_eq!(capability.call_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_respects_variation_count() {
        let capability =
            ScriptedCapability::new(vec![Ok(image_response()), Ok(image_response())]);
        let generator = LogoGenerator::new(capability.clone()).with_variations(2);

        let result = generator.generate_batch(&brief()).await.unwrap();
        assert_eq!(result.images.len(), 2);
        assert_eq!(capability.call_count(), 2);
    }

    #[test]
    fn test_derive_seed_stays_in_range() {
        for index in 0..DEFAULT_VARIATIONS {
            let seed = derive_seed(index);
            assert!(seed >= index as i64);
            assert!(seed < 1_000_000 + index as i64);
        }
    }
}
