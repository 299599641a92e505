// HTTP request handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::session::SessionError;
use super::ChatServer;
use crate::chat::SessionSnapshot;
use crate::emotion::{normalize_text, EmotionCategory};
use crate::responder::ReplySource;

/// Create the main application router
pub fn create_router(server: Arc<ChatServer>) -> Router {
    Router::new()
        .route("/v1/chat", post(handle_chat))
        .route("/v1/classify", post(handle_classify))
        .route("/v1/session/:id", get(get_session).delete(delete_session))
        .route("/v1/session/:id/reset", post(reset_session))
        .route("/v1/status", get(get_status))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server)
}

/// Request body for /v1/chat
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Session ID for conversation continuity
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub source: ReplySource,
    pub emotion: EmotionCategory,
    pub confidence: f64,
}

/// Handle POST /v1/chat - one conversation turn
async fn handle_chat(
    State(server): State<Arc<ChatServer>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let mut session = server
        .session_manager()
        .checkout(request.session_id.as_deref())
        .await?;

    let outcome = server.engine().handle_turn(&mut session, &request.message).await;

    tracing::info!(
        session_id = %session.id(),
        emotion = outcome.classification.category.label(),
        source = outcome.reply.source.as_str(),
        "Chat turn completed"
    );

    Ok(Json(ChatResponse {
        session_id: session.id().to_string(),
        reply: outcome.reply.text,
        source: outcome.reply.source,
        emotion: outcome.classification.category,
        confidence: outcome.classification.confidence,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: EmotionCategory,
    pub id: u8,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub confidence: f64,
    /// Stop-word filtered text, informational only
    pub normalized: String,
}

/// Handle POST /v1/classify - classification without a reply
async fn handle_classify(
    State(server): State<Arc<ChatServer>>,
    Json(request): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    let result = server.engine().classify(&request.text);
    let category = result.category;

    Json(ClassifyResponse {
        category,
        id: category.id(),
        label: category.label(),
        emoji: category.emoji(),
        color: category.color(),
        confidence: result.confidence,
        normalized: normalize_text(&request.text),
    })
}

/// Handle GET /v1/session/:id - Retrieve session state
async fn get_session(
    State(server): State<Arc<ChatServer>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = server.session_manager().require(&session_id)?;
    let session = shared.lock().await;
    Ok(Json(session.snapshot()))
}

/// Handle POST /v1/session/:id/reset - start a new chat in the same session
async fn reset_session(
    State(server): State<Arc<ChatServer>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let shared = server.session_manager().require(&session_id)?;
    shared.lock().await.reset();
    tracing::info!(session_id = %session_id, "Session reset");
    Ok(StatusCode::NO_CONTENT)
}

/// Handle DELETE /v1/session/:id - Delete session
async fn delete_session(
    State(server): State<Arc<ChatServer>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if server.session_manager().delete(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SessionError::NotFound(session_id).into())
    }
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub remote_enabled: bool,
    pub client: String,
    pub model: String,
    pub environment: String,
    pub confidence_threshold: f64,
    pub max_retries: u32,
    pub max_conversation_history: usize,
    pub active_sessions: usize,
    pub max_sessions: usize,
}

/// Handle GET /v1/status - Get server and model status
async fn get_status(State(server): State<Arc<ChatServer>>) -> Json<StatusResponse> {
    let config = server.config();
    let generator = server.engine().generator();

    Json(StatusResponse {
        remote_enabled: generator.remote_enabled(),
        client: generator.client_name().to_string(),
        model: generator.settings().model.clone(),
        environment: config.app.environment.to_string(),
        confidence_threshold: config.model.emotion_confidence_threshold,
        max_retries: config.openai.max_retries,
        max_conversation_history: config.model.max_conversation_history,
        active_sessions: server.session_manager().active_count(),
        max_sessions: server.session_manager().max_sessions(),
    })
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Handle GET /health - Health check endpoint
pub async fn health_check(State(server): State<Arc<ChatServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: server.uptime().as_secs(),
        active_sessions: server.session_manager().active_count(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint(State(server): State<Arc<ChatServer>>) -> Result<Response, AppError> {
    let metrics = server.engine().metrics().render()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics,
    )
        .into_response())
}

/// Application error wrapper for proper HTTP error responses
pub struct AppError {
    status: StatusCode,
    kind: &'static str,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request_error",
            error: anyhow::anyhow!(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "Request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.error, "Request rejected");
        }

        let body = serde_json::json!({
            "error": {
                "message": self.error.to_string(),
                "type": self.kind
            }
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let (status, kind) = match &err {
            SessionError::LimitReached { .. } => (StatusCode::SERVICE_UNAVAILABLE, "overloaded_error"),
            SessionError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found_error"),
        };
        Self {
            status,
            kind,
            error: err.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "api_error",
            error: err,
        }
    }
}
