// Repository layer for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============================================
    // Users (synced from the identity provider)
    // ============================================

    /// Create-or-update a user keyed by identity-provider subject.
    /// Profile fields are refreshed on every sync.
    pub async fn upsert_user(&self, input: UpsertUser) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (subject, email, name, avatar_url, language)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'en'))
            ON CONFLICT (subject) DO UPDATE
            SET
                email = EXCLUDED.email,
                name = COALESCE(EXCLUDED.name, users.name),
                avatar_url = COALESCE(EXCLUDED.avatar_url, users.avatar_url),
                language = COALESCE($5, users.language),
                updated_at = NOW()
            RETURNING id, subject, email, name, avatar_url, language, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.subject)
        .bind(&input.email)
        .bind(&input.name)
        .bind(&input.avatar_url)
        .bind(&input.language)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_subject(&self, subject: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, subject, email, name, avatar_url, language, is_active, created_at, updated_at
            FROM users
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, subject, email, name, avatar_url, language, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Chat sessions
    // ============================================

    pub async fn create_chat_session(&self, input: CreateChatSession) -> Result<ChatSessionRow> {
        let row = sqlx::query_as::<_, ChatSessionRow>(
            r#"
            INSERT INTO chat_sessions (user_id, title, preset, countries, query_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, preset, countries, query_type, is_active, created_at, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.title)
        .bind(&input.preset)
        .bind(&input.countries)
        .bind(&input.query_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_chat_session(&self, id: Uuid) -> Result<Option<ChatSessionRow>> {
        let row = sqlx::query_as::<_, ChatSessionRow>(
            r#"
            SELECT id, user_id, title, preset, countries, query_type, is_active, created_at, updated_at
            FROM chat_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List a user's active sessions, newest first.
    pub async fn list_chat_sessions(&self, user_id: Uuid) -> Result<Vec<ChatSessionRow>> {
        let rows = sqlx::query_as::<_, ChatSessionRow>(
            r#"
            SELECT id, user_id, title, preset, countries, query_type, is_active, created_at, updated_at
            FROM chat_sessions
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Soft-delete: clear the is_active flag, keep the rows.
    pub async fn archive_chat_session(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE chat_sessions
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete the session and its messages in one transaction.
    pub async fn purge_chat_session(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM messages WHERE session_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Messages (PRIMARY conversation data)
    // ============================================

    pub async fn create_message(&self, input: CreateMessage) -> Result<MessageRow> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (session_id, role, content, metadata)
            VALUES ($1, $2, $3, $4)
            RETURNING id, session_id, role, content, metadata, created_at
            "#,
        )
        .bind(input.session_id)
        .bind(&input.role)
        .bind(&input.content)
        .bind(&input.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_messages(&self, session_id: Uuid) -> Result<Vec<MessageRow>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, session_id, role, content, metadata, created_at
            FROM messages
            WHERE session_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
