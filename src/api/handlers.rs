//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, CreateSessionResponse, ErrorResponse, HealthResponse,
    MessageResponse, ModelsResponse, SubmitRequest, SubmitResponse, SuccessResponse,
};
use super::AppState;
use crate::collaborator::{Collaborator, OutboundRequest};
use crate::runtime::{SessionHandle, SubmitAck, SubmitError};
use crate::session::{Exchange, SessionSnapshot};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/version", get(get_version))
        // Assistant backend
        .route("/api/chat", post(chat))
        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/submit", post(submit_question))
        .route("/api/sessions/:id/stream", get(stream_session))
        // Model info
        .route("/api/models", get(list_models))
        .with_state(state)
}

// ============================================================
// Status
// ============================================================

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Thinkr API is running",
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn get_version() -> &'static str {
    concat!("thinkr ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Assistant Backend
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    if req.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query cannot be empty".to_string()));
    }

    let history = req.chat_history.into_iter().map(Exchange::from).collect();
    let request = OutboundRequest::new(req.query, history);
    let response = state.assistant.complete(&request).await.map_err(|failure| {
        tracing::error!(
            error = %failure.message,
            detail = failure.detail.as_deref().unwrap_or(""),
            "Chat request failed"
        );
        AppError::Internal(failure.message)
    })?;

    Ok(Json(ChatResponse { response }))
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let handle = state.sessions.create().await;
    Json(CreateSessionResponse {
        id: handle.id().to_string(),
    })
}

async fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = find_session(&state, &id).await?;
    let snapshot = handle
        .snapshot()
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session closed: {id}")))?;
    Ok(Json(snapshot))
}

async fn submit_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let handle = find_session(&state, &id).await?;

    match handle.submit(req.question).await {
        Ok(SubmitAck::Accepted) => Ok((StatusCode::ACCEPTED, Json(SubmitResponse { accepted: true }))),
        Ok(SubmitAck::Ignored) => Ok((StatusCode::OK, Json(SubmitResponse { accepted: false }))),
        Err(e @ SubmitError::Busy) => Err(AppError::Conflict(e.to_string())),
        Err(e @ SubmitError::Closed) => Err(AppError::NotFound(e.to_string())),
        Err(e @ SubmitError::Internal) => Err(AppError::Internal(e.to_string())),
    }
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let handle = find_session(&state, &id).await?;

    // Subscribe first so nothing between snapshot and stream is lost
    let broadcast_rx = handle.subscribe();
    let snapshot = handle
        .snapshot()
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session closed: {id}")))?;

    Ok(sse_stream(handle, snapshot, broadcast_rx))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.discard(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session not found: {id}")))
    }
}

// ============================================================
// Model Info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
