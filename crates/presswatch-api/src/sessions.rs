// Chat session CRUD HTTP routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, post},
    Extension, Json, Router,
};
use presswatch_contracts::{
    ChatSession, CreateSessionRequest, DeleteSessionQuery, ListResponse,
};
use presswatch_storage::{ChatSessionRow, CreateChatSession, Database, UserRow};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;

/// App state for session routes
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
        .route("/v1/sessions", post(create_session).get(list_sessions))
        .route("/v1/sessions/:session_id", delete(delete_session))
        .with_state(state)
}

/// Resolve the caller's user row; callers must sync before using sessions.
pub(crate) async fn resolve_user(
    db: &Database,
    caller: &CurrentUser,
) -> Result<UserRow, StatusCode> {
    db.get_user_by_subject(&caller.subject)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve user: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::FORBIDDEN)
}

/// Fetch a session and verify the caller owns it. Foreign sessions are
/// reported as absent, not forbidden.
pub(crate) async fn resolve_owned_session(
    db: &Database,
    caller: &CurrentUser,
    session_id: Uuid,
) -> Result<ChatSessionRow, StatusCode> {
    let user = resolve_user(db, caller).await?;
    let session = db
        .get_chat_session(session_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get session: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    if session.user_id != user.id {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(session)
}

/// POST /v1/sessions - Create a new chat session
#[utoipa::path(
    post,
    path = "/v1/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created successfully", body = ChatSession),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ChatSession>), StatusCode> {
    let user = resolve_user(&state.db, &caller).await?;

    let row = state
        .db
        .create_chat_session(CreateChatSession {
            user_id: user.id,
            title: req.title,
            preset: req.preset,
            countries: req.countries,
            query_type: req.query_type,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create session: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((StatusCode::CREATED, Json(ChatSession::from(row))))
}

/// GET /v1/sessions - List the caller's active sessions
#[utoipa::path(
    get,
    path = "/v1/sessions",
    responses(
        (status = 200, description = "List of sessions", body = ListResponse<ChatSession>),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<ListResponse<ChatSession>>, StatusCode> {
    let user = resolve_user(&state.db, &caller).await?;

    let rows = state.db.list_chat_sessions(user.id).await.map_err(|e| {
        tracing::error!("Failed to list sessions: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ListResponse::new(
        rows.into_iter().map(ChatSession::from).collect(),
    )))
}

/// DELETE /v1/sessions/{session_id} - Delete a session
///
/// Default is a soft delete (clears `is_active`). With `?purge=true` the
/// session and its messages are removed in one transaction.
#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        DeleteSessionQuery
    ),
    responses(
        (status = 204, description = "Session deleted successfully"),
        (status = 404, description = "Session not found"),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DeleteSessionQuery>,
) -> Result<StatusCode, StatusCode> {
    resolve_owned_session(&state.db, &caller, session_id).await?;

    let deleted = if query.purge {
        state.db.purge_chat_session(session_id).await
    } else {
        state.db.archive_chat_session(session_id).await
    }
    .map_err(|e| {
        tracing::error!("Failed to delete session: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
