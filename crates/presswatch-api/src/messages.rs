// Message HTTP routes (nested under sessions)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use presswatch_contracts::{ChatMessage, CreateMessageRequest, ListResponse};
use presswatch_storage::{CreateMessage, Database};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::sessions::resolve_owned_session;

/// App state for message routes
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/sessions/:session_id/messages",
            post(create_message).get(list_messages),
        )
        .with_state(state)
}

/// POST /v1/sessions/{session_id}/messages - Append a message
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/messages",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message created successfully", body = ChatMessage),
        (status = 404, description = "Session not found"),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "messages"
)]
pub async fn create_message(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), StatusCode> {
    resolve_owned_session(&state.db, &caller, session_id).await?;

    let row = state
        .db
        .create_message(CreateMessage {
            session_id,
            role: req.role.to_string(),
            content: req.content,
            metadata: req.metadata,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create message: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((StatusCode::CREATED, Json(ChatMessage::from(row))))
}

/// GET /v1/sessions/{session_id}/messages - List messages ordered by time
#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}/messages",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "List of messages", body = ListResponse<ChatMessage>),
        (status = 404, description = "Session not found"),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ListResponse<ChatMessage>>, StatusCode> {
    resolve_owned_session(&state.db, &caller, session_id).await?;

    let rows = state.db.list_messages(session_id).await.map_err(|e| {
        tracing::error!("Failed to list messages: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ListResponse::new(
        rows.into_iter().map(ChatMessage::from).collect(),
    )))
}
