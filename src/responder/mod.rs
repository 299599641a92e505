// Response generation
//
// Produces the bot reply for one turn. A single remote completion attempt
// is made when a client is available; every failure, including timeout and
// cancellation, degrades to the fallback table. Nothing here returns an error.

mod fallback;
mod prompt;

pub use fallback::{generic_reply, FallbackTable};
pub use prompt::{build_messages, system_prompt};

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::OpenAISettings;
use crate::emotion::EmotionCategory;
use crate::providers::{CompletionClient, CompletionRequest, RemoteCallError};

/// Generation parameters fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one remote call
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&OpenAISettings::default())
    }
}

impl From<&OpenAISettings> for GenerationSettings {
    fn from(settings: &OpenAISettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: settings.timeout(),
        }
    }
}

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Remote,
    Fallback,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Remote => "remote",
            ReplySource::Fallback => "fallback",
        }
    }
}

/// Non-fatal remote failure reported alongside a fallback reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub message: String,
}

impl From<&RemoteCallError> for Diagnostic {
    fn from(error: &RemoteCallError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
    /// Set when a remote call was attempted and failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl Reply {
    pub fn is_fallback(&self) -> bool {
        self.source == ReplySource::Fallback
    }
}

/// Reply generator over an injected completion client
#[derive(Clone)]
pub struct ResponseGenerator {
    client: Arc<dyn CompletionClient>,
    fallbacks: Arc<FallbackTable>,
    settings: GenerationSettings,
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("client", &self.client.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, settings: GenerationSettings) -> Self {
        Self {
            client,
            fallbacks: Arc::new(FallbackTable::reference()),
            settings,
        }
    }

    pub fn with_fallbacks(mut self, fallbacks: FallbackTable) -> Self {
        self.fallbacks = Arc::new(fallbacks);
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn fallbacks(&self) -> &FallbackTable {
        &self.fallbacks
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Whether replies may come from the remote service
    pub fn remote_enabled(&self) -> bool {
        self.client.is_available()
    }

    /// Completion request for one turn
    pub fn build_request(&self, user_text: &str, category: EmotionCategory) -> CompletionRequest {
        CompletionRequest::new(self.settings.model.clone(), build_messages(user_text, category))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
    }

    /// Reply for one message; never fails
    pub async fn generate_response(&self, user_text: &str, category: EmotionCategory) -> Reply {
        self.generate_response_with_cancel(user_text, category, &CancellationToken::new())
            .await
    }

    /// Like `generate_response`, but cancelling the token abandons the remote
    /// call immediately and yields the fallback reply
    pub async fn generate_response_with_cancel(
        &self,
        user_text: &str,
        category: EmotionCategory,
        cancel: &CancellationToken,
    ) -> Reply {
        if !self.client.is_available() {
            tracing::debug!(client = self.client.name(), "Remote completion unavailable, using fallback");
            return self.fallback(category, None);
        }

        let request = self.build_request(user_text, category);
        match self.request_remote(&request, cancel).await {
            Ok(text) => {
                tracing::debug!(
                    client = self.client.name(),
                    emotion = category.label(),
                    reply_len = text.len(),
                    "Remote reply received"
                );
                Reply {
                    text,
                    source: ReplySource::Remote,
                    diagnostic: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    client = self.client.name(),
                    kind = e.kind(),
                    error = %e,
                    "Remote completion failed, using fallback reply"
                );
                self.fallback(category, Some(Diagnostic::from(&e)))
            }
        }
    }

    async fn request_remote(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, RemoteCallError> {
        let call = tokio::time::timeout(self.settings.timeout, self.client.complete(request));

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RemoteCallError::Cancelled),
            result = call => match result {
                Ok(response) => response?,
                Err(_) => return Err(RemoteCallError::Timeout(self.settings.timeout)),
            },
        };

        let text = response.first_text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(RemoteCallError::MalformedResponse(
                "completion contained no text".to_string(),
            ));
        }
        Ok(text.to_string())
    }

    fn fallback(&self, category: EmotionCategory, diagnostic: Option<Diagnostic>) -> Reply {
        Reply {
            text: self.fallbacks.reply_for(category),
            source: ReplySource::Fallback,
            diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionChoice, CompletionResponse, NullCompletionClient};
    use async_trait::async_trait;

    struct FixedClient(&'static str);

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, RemoteCallError> {
            Ok(CompletionResponse {
                id: "test".to_string(),
                model: request.model.clone(),
                choices: vec![CompletionChoice {
                    index: 0,
                    content: self.0.to_string(),
                }],
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_null_client_short_circuits() {
        let generator = ResponseGenerator::new(
            Arc::new(NullCompletionClient::default()),
            GenerationSettings::default(),
        );
        let reply = generator.generate_response("hi", EmotionCategory::Happy).await;
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.diagnostic.is_none());
        assert_eq!(reply.text, FallbackTable::reference().reply_for(EmotionCategory::Happy));
    }

    #[tokio::test]
    async fn test_remote_reply_is_trimmed() {
        let generator = ResponseGenerator::new(
            Arc::new(FixedClient("  You sound great!\n")),
            GenerationSettings::default(),
        );
        let reply = generator.generate_response("hi", EmotionCategory::Happy).await;
        assert_eq!(reply.source, ReplySource::Remote);
        assert_eq!(reply.text, "You sound great!");
    }

    #[tokio::test]
    async fn test_blank_remote_reply_falls_back() {
        let generator = ResponseGenerator::new(Arc::new(FixedClient("   ")), GenerationSettings::default());
        let reply = generator.generate_response("hi", EmotionCategory::Sad).await;
        assert!(reply.is_fallback());
        assert_eq!(reply.diagnostic.map(|d| d.kind), Some("malformed_response"));
    }

    #[test]
    fn test_build_request_uses_settings() {
        let settings = GenerationSettings {
            model: "gpt-test".to_string(),
            temperature: 0.2,
            max_tokens: 42,
            timeout: Duration::from_secs(1),
        };
        let generator = ResponseGenerator::new(Arc::new(NullCompletionClient::default()), settings);
        let request = generator.build_request("hello", EmotionCategory::Neutral);
        assert_eq!(request.model, "gpt-test");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 42);
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0].content.contains("seems neutral"));
    }
}
