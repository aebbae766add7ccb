use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::gateway::{GenerationRequest, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Serialize, Debug)]
struct Part {
    text: String,
}

#[derive(Serialize, Debug)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.user_content.clone(),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system_instruction.clone(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or `None` when it carries no text
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn query(&self, request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
        let body = GenerateContentRequest::from(request);

        tracing::debug!(model = %self.model, "sending generateContent request");

        let response = self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        Ok(parsed.into_text())
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gemini-3-flash-preview".to_string(),
            "gemini-2.5-flash".to_string(),
            "gemini-2.5-pro".to_string(),
            "gemini-2.0-flash".to_string(),
        ]
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
        self.query(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Option<String> {
        serde_json::from_value::<GenerateContentResponse>(value)
            .unwrap()
            .into_text()
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest {
            user_content: "show me boots".to_string(),
            system_instruction: "be punk".to_string(),
            temperature: 0.9,
        };
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "show me boots");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be punk");
        assert!(body["systemInstruction"].get("role").is_none());
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let text = parse(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Try the " }, { "text": "Anarchy Combat Boots." }] }
            }]
        }));
        assert_eq!(text.as_deref(), Some("Try the Anarchy Combat Boots."));
    }

    #[test]
    fn test_response_without_candidates() {
        assert_eq!(parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } })), None);
    }

    #[test]
    fn test_response_with_empty_text() {
        let text = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] }, "finishReason": "STOP" }]
        }));
        assert_eq!(text, None);
    }

    #[test]
    fn test_response_whitespace_text_is_kept() {
        let text = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] }, "finishReason": "STOP" }]
        }));
        assert_eq!(text.as_deref(), Some("  "));
    }

    #[test]
    fn test_candidate_without_content() {
        assert_eq!(parse(json!({ "candidates": [{ "finishReason": "SAFETY" }] })), None);
    }

    #[test]
    fn test_endpoint_uses_model_and_trims_slash() {
        let client = GeminiClient::new("key")
            .with_base_url("http://localhost:9000/")
            .with_model("gemini-2.5-pro");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
