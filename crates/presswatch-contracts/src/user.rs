// User DTOs
//
// Users are synced from the identity provider on login: the provider's
// opaque subject is the natural key, everything else is profile data we
// keep fresh on each sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A user account, keyed internally by UUID and externally by the
/// identity provider's subject claim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Identity-provider subject (e.g. `auth0|abc123`).
    pub subject: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Preferred UI locale code.
    pub language: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create-or-update the caller's user row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncUserRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Defaults to "en" when omitted.
    #[serde(default)]
    pub language: Option<String>,
}
