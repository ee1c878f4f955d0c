// User sync HTTP route

use axum::{extract::State, http::StatusCode, routing::post, Extension, Json, Router};
use presswatch_contracts::{SyncUserRequest, User};
use presswatch_storage::{Database, UpsertUser};
use std::sync::Arc;

use crate::auth::CurrentUser;

/// App state for user routes
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
        .route("/v1/users/sync", post(sync_user))
        .with_state(state)
}

/// POST /v1/users/sync - Create-or-update the caller's user row
///
/// Keyed by the identity provider's subject claim; called by the UI after
/// every login so profile data stays fresh.
#[utoipa::path(
    post,
    path = "/v1/users/sync",
    request_body = SyncUserRequest,
    responses(
        (status = 200, description = "User synced", body = User),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn sync_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Json(req): Json<SyncUserRequest>,
) -> Result<Json<User>, StatusCode> {
    let row = state
        .db
        .upsert_user(UpsertUser {
            subject: caller.subject,
            email: req.email,
            name: req.name.or(caller.name),
            avatar_url: req.avatar_url,
            language: req.language,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to sync user: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(User::from(row)))
}
