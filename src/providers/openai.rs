// OpenAI chat-completions client
//
// Works against api.openai.com and any server speaking the same
// /v1/chat/completions format. One attempt per call, no retry.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{ChatMessage, CompletionChoice, CompletionRequest, CompletionResponse};
use super::{CompletionClient, RemoteCallError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Create a client for api.openai.com with the default timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self, RemoteCallError> {
        Self::with_options(
            api_key,
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with a custom base URL and request timeout
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteCallError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteCallError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn to_openai_request<'a>(&self, request: &'a CompletionRequest) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> RemoteCallError {
        if err.is_timeout() {
            RemoteCallError::Timeout(self.timeout)
        } else {
            RemoteCallError::Network(err.to_string())
        }
    }

    fn map_status_error(status: StatusCode, retry_after: Option<u64>, body: String) -> RemoteCallError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteCallError::Authentication(extract_error_message(&body).unwrap_or(body))
            }
            StatusCode::TOO_MANY_REQUESTS => RemoteCallError::RateLimited {
                retry_after_secs: retry_after,
            },
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                RemoteCallError::Network(format!("Upstream timeout ({})", status))
            }
            _ => RemoteCallError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body).unwrap_or(body),
            },
        }
    }

    fn from_openai_response(response: OpenAIResponse) -> Result<CompletionResponse, RemoteCallError> {
        let mut choices = response.choices.into_iter();

        let first = choices.next().ok_or_else(|| {
            RemoteCallError::MalformedResponse("OpenAI returned no choices in response".to_string())
        })?;
        let first_content = first.message.content.ok_or_else(|| {
            RemoteCallError::MalformedResponse(format!(
                "Choice {} has no message content",
                first.index
            ))
        })?;

        // Only the first choice is required; later ones without content are dropped
        let choices = std::iter::once(CompletionChoice {
            index: first.index,
            content: first_content,
        })
        .chain(choices.filter_map(|choice| {
            choice.message.content.map(|content| CompletionChoice {
                index: choice.index,
                content,
            })
        }))
        .collect();

        Ok(CompletionResponse {
            id: response.id,
            model: response.model,
            choices,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, RemoteCallError> {
        let body = self.to_openai_request(request);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::map_status_error(status, retry_after, error_body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let parsed: OpenAIResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteCallError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(id = %parsed.id, choices = parsed.choices.len(), "Received chat completion");

        Self::from_openai_response(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Pull `error.message` out of an OpenAI error body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    #[serde(default)]
    index: u32,
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}
