//! The stylist gateway: turns one shopper utterance into one call to a
//! text-generation service.
//!
//! The persona directive and sampling temperature are fixed. The gateway
//! never touches the conversation; whoever awaits [`StylistGateway::ask`]
//! feeds the outcome back into it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ai::GeminiClient;
use crate::catalog;
use crate::config::Config;
use crate::error::GatewayError;

pub const TEMPERATURE: f32 = 0.9;

/// Everything the remote service needs for one generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub user_content: String,
    pub system_instruction: String,
    pub temperature: f32,
}

/// A remote text-generation capability.
///
/// `Ok(None)` means the service answered but produced no text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GatewayError>;
}

/// Builds the stylist persona from the pieces it may recommend
pub fn persona_directive() -> String {
    let items = catalog::recommendable()
        .iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are the AI stylist for Rebel Youth Collective. Your vibe is rude, helpful, and extremely punk. \
         You love black, neon green, and distressed clothing. \
         You specifically know about these products: {}. \
         If someone asks for a look, recommend one of these specific items.",
        items
    )
}

#[derive(Clone)]
pub struct StylistGateway {
    generator: Arc<dyn TextGenerator>,
    directive: Arc<str>,
}

impl StylistGateway {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            directive: persona_directive().into(),
        }
    }

    /// Gemini-backed gateway, or `None` when no credential is configured
    pub fn from_config(config: &Config) -> Option<Self> {
        Self::from_credential(config, config.resolve_api_key())
    }

    /// Gemini-backed gateway using an already resolved credential
    pub fn from_credential(config: &Config, api_key: Option<String>) -> Option<Self> {
        let Some(api_key) = api_key else {
            tracing::warn!("no API key configured, stylist is offline");
            return None;
        };

        let client = GeminiClient::new(&api_key)
            .with_model(config.model())
            .with_base_url(config.base_url());

        Some(Self::new(Arc::new(client)))
    }

    pub fn request_for(&self, utterance: &str) -> GenerationRequest {
        GenerationRequest {
            user_content: utterance.to_string(),
            system_instruction: self.directive.to_string(),
            temperature: TEMPERATURE,
        }
    }

    /// Issues exactly one generation call for `utterance`.
    pub async fn ask(&self, utterance: &str) -> Result<Option<String>, GatewayError> {
        let request = self.request_for(utterance);
        let outcome = self.generator.generate(&request).await;

        match &outcome {
            Ok(Some(text)) => tracing::debug!(chars = text.chars().count(), "stylist replied"),
            Ok(None) => tracing::info!("stylist returned no text"),
            Err(e) => tracing::warn!(error = %e, "stylist call failed"),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<GenerationRequest>>,
        reply: Option<String>,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
            Err(GatewayError::Status {
                status: 401,
                body: "API key not valid".to_string(),
            })
        }
    }

    #[test]
    fn test_persona_lists_recommendable_items() {
        let directive = persona_directive();
        assert!(directive.starts_with("You are the AI stylist for Rebel Youth Collective."));
        assert!(directive.contains("'Rebel Jersey 99', 'Glitch Mesh Shorts', 'Anarchy Combat Boots', 'Graffiti Denim Vest', 'Splatter Hoodie'"));
        assert!(!directive.contains("Neon High-Tops"));
    }

    #[tokio::test]
    async fn test_ask_sends_one_request_with_fixed_directive() {
        let generator = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
            reply: Some("Boots. Obviously.".to_string()),
        });
        let gateway = StylistGateway::new(generator.clone());

        let reply = gateway.ask("show me boots").await.unwrap();
        assert_eq!(reply.as_deref(), Some("Boots. Obviously."));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].user_content, "show me boots");
        assert_eq!(seen[0].system_instruction, persona_directive());
        assert_eq!(seen[0].temperature, TEMPERATURE);
    }

    #[tokio::test]
    async fn test_ask_passes_through_empty_and_errors() {
        let empty = StylistGateway::new(Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
            reply: None,
        }));
        assert_eq!(empty.ask("hi").await.unwrap(), None);

        let failing = StylistGateway::new(Arc::new(Failing));
        assert!(matches!(
            failing.ask("hi").await,
            Err(GatewayError::Status { status: 401, .. })
        ));
    }

    #[test]
    fn test_gateway_built_from_file_key() {
        let config = Config {
            api_key: Some("file-key".to_string()),
            ..Config::default()
        };
        let api_key = config.resolve_api_key_with(|_| None);
        assert_eq!(api_key.as_deref(), Some("file-key"));
        assert!(StylistGateway::from_credential(&config, api_key).is_some());

        let api_key = Config::default().resolve_api_key_with(|_| None);
        assert!(StylistGateway::from_credential(&Config::default(), api_key).is_none());
    }
}
