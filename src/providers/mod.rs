// Completion providers
//
// Abstraction over the hosted chat-completion service. The responder only
// talks to `CompletionClient`; when no credential is configured a
// `NullCompletionClient` stands in so the fallback path needs no special
// casing.

use async_trait::async_trait;

pub mod error;
pub mod factory;
pub mod null;
pub mod openai;
pub mod types;

pub use error::RemoteCallError;
pub use factory::create_client;
pub use null::NullCompletionClient;
pub use openai::OpenAIClient;
pub use types::{ChatMessage, ChatRole, CompletionChoice, CompletionRequest, CompletionResponse};

/// Trait for chat-completion backends
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one completion request and wait for the full response
    ///
    /// Implementations make exactly one attempt; retrying is the caller's business.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, RemoteCallError>;

    /// Provider name for logs ("openai", "null", ...)
    fn name(&self) -> &str;

    /// Whether this client can reach a remote service at all
    fn is_available(&self) -> bool {
        true
    }
}
