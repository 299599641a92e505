// Null completion client
//
// Used when no credential is configured or remote completions are turned
// off. Never touches the network.

use async_trait::async_trait;

use super::{CompletionClient, CompletionRequest, CompletionResponse, RemoteCallError};

#[derive(Debug, Clone)]
pub struct NullCompletionClient {
    reason: String,
}

impl NullCompletionClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the remote service is unavailable
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Default for NullCompletionClient {
    fn default() -> Self {
        Self::new("no completion service configured")
    }
}

#[async_trait]
impl CompletionClient for NullCompletionClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, RemoteCallError> {
        Err(RemoteCallError::Unavailable)
    }

    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }
}
