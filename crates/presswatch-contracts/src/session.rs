// Chat session DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// A chat session groups the messages of one research conversation.
/// Sessions are soft-deleted: `is_active` is cleared instead of removing
/// the row, so history can be restored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Country preset the session was started with (e.g. "neighbors_priority").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Source-country codes selected for press search.
    pub countries: Vec<String>,
    /// Query mode: "about", "in", or "cross_reference".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Human-readable title, usually derived from the first query.
    #[schema(example = "Energy coverage in Turkish press")]
    pub title: String,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub query_type: Option<String>,
}

/// Query parameters for session deletion
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DeleteSessionQuery {
    /// When true, hard-delete the session and its messages in one
    /// transaction instead of clearing `is_active`.
    #[serde(default)]
    pub purge: bool,
}
