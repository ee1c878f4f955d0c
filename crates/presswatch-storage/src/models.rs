// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use presswatch_contracts::{ChatMessage, ChatSession, MessageRole, User};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// User models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub language: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub language: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            subject: row.subject,
            email: row.email,
            name: row.name,
            avatar_url: row.avatar_url,
            language: row.language,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================
// Chat session models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ChatSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub preset: Option<String>,
    pub countries: Vec<String>,
    pub query_type: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateChatSession {
    pub user_id: Uuid,
    pub title: String,
    pub preset: Option<String>,
    pub countries: Vec<String>,
    pub query_type: Option<String>,
}

impl From<ChatSessionRow> for ChatSession {
    fn from(row: ChatSessionRow) -> Self {
        ChatSession {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            preset: row.preset,
            countries: row.countries,
            query_type: row.query_type,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================
// Message models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: String,
    pub content: String,
    pub metadata: Option<sqlx::types::JsonValue>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub session_id: Uuid,
    pub role: String,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            id: row.id,
            session_id: row.session_id,
            role: MessageRole::from(row.role.as_str()),
            content: row.content,
            metadata: row.metadata,
            created_at: row.created_at,
        }
    }
}
