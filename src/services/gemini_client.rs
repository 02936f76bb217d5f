// src/services/gemini_client.rs
use crate::errors::BrandforgeError;
use crate::models::GenerationRequest;
use crate::services::generator::{CapabilityError, ImageGenCapability};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Gemini generateContent client. Holds the credential as an option so the
/// server can start without one; every batch checks `ensure_ready` first and
/// fails with a distinct error instead of issuing doomed requests.
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
        }
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut parts = vec![json!({ "text": request.user_prompt })];

        if let Some(reference) = &request.reference_image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": reference.mime_type,
                    "data": reference.data
                }
            }));
        }

        json!({
            "contents": [{ "parts": parts }],
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "generationConfig": { "seed": request.seed }
        })
    }
}

#[async_trait]
impl ImageGenCapability for GeminiClient {
    fn ensure_ready(&self) -> Result<(), BrandforgeError> {
        if self.api_key.is_none() {
            return Err(BrandforgeError::MissingCredential(GEMINI_API_KEY_ENV));
        }
        Ok(())
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value, CapabilityError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CapabilityError::Network("API credential missing".to_string()))?;

        debug!(
            "issuing generation attempt {} (seed {})",
            request.variation_index + 1,
            request.seed
        );

        let url = format!("{}/models/{}:generateContent", API_BASE, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| CapabilityError::Network(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CapabilityError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EncodedImage;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "persona".to_string(),
            user_prompt: "draw a logo".to_string(),
            seed: 424_242,
            variation_index: 0,
            reference_image: None,
        }
    }

    #[test]
    fn test_ensure_ready_without_key() {
        let client = GeminiClient::new(None);
        assert!(matches!(
            client.ensure_ready(),
            Err(BrandforgeError::MissingCredential(GEMINI_API_KEY_ENV))
        ));
    }

    #[test]
    fn test_ensure_ready_rejects_blank_key() {
        let client = GeminiClient::new(Some("   ".to_string()));
        assert!(client.ensure_ready().is_err());

        let client = GeminiClient::new(Some("key-123".to_string()));
        assert!(client.ensure_ready().is_ok());
    }

    #[test]
    fn test_request_body_threads_prompt_and_seed() {
        let client = GeminiClient::new(Some("key".to_string()));
        let body = client.request_body(&request());

        assert_eq!(body["contents"][0]["parts"][0]["text"], "draw a logo");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "persona"
        );
        assert_eq!(body["generationConfig"]["seed"], 424_242);
    }

    #[test]
    fn test_request_body_includes_reference_image_part() {
        let client = GeminiClient::new(Some("key".to_string()));
        let mut req = request();
        req.reference_image = Some(EncodedImage {
            mime_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        });

        let body = client.request_body(&req);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "aGVsbG8=");
    }
}
