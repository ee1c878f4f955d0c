// HTTP client for the Presswatch API

use presswatch_contracts::{
    ChatMessage, ChatSession, CreateMessageRequest, CreateSessionRequest, ListResponse,
    ResearchRequest, ResearchResponse, SyncUserRequest, User,
};
use reqwest::Method;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::stream::{decode_response, EventStream};

/// Client for one Presswatch API server.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token, sent on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ClientError::Status(response.status()))
        }
    }

    /// Create-or-update the caller's user row.
    pub async fn sync_user(&self, req: &SyncUserRequest) -> Result<User> {
        let response = self
            .request(Method::POST, "/v1/users/sync")
            .json(req)
            .send()
            .await?;
        Ok(Self::check_status(response)?.json().await?)
    }

    pub async fn create_session(&self, req: &CreateSessionRequest) -> Result<ChatSession> {
        let response = self
            .request(Method::POST, "/v1/sessions")
            .json(req)
            .send()
            .await?;
        Ok(Self::check_status(response)?.json().await?)
    }

    pub async fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        let response = self.request(Method::GET, "/v1/sessions").send().await?;
        let list: ListResponse<ChatSession> = Self::check_status(response)?.json().await?;
        Ok(list.data)
    }

    /// Delete a session. Soft by default; `purge` removes it and its
    /// messages permanently.
    pub async fn delete_session(&self, session_id: Uuid, purge: bool) -> Result<()> {
        let path = if purge {
            format!("/v1/sessions/{}?purge=true", session_id)
        } else {
            format!("/v1/sessions/{}", session_id)
        };
        let response = self.request(Method::DELETE, &path).send().await?;
        Self::check_status(response)?;
        Ok(())
    }

    pub async fn create_message(
        &self,
        session_id: Uuid,
        req: &CreateMessageRequest,
    ) -> Result<ChatMessage> {
        let response = self
            .request(Method::POST, &format!("/v1/sessions/{}/messages", session_id))
            .json(req)
            .send()
            .await?;
        Ok(Self::check_status(response)?.json().await?)
    }

    pub async fn list_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>> {
        let response = self
            .request(Method::GET, &format!("/v1/sessions/{}/messages", session_id))
            .send()
            .await?;
        let list: ListResponse<ChatMessage> = Self::check_status(response)?.json().await?;
        Ok(list.data)
    }

    /// Start a streaming research run. Errors here mean the connection
    /// could not be established; stream-level failures arrive as `error`
    /// events instead.
    pub async fn research_stream(&self, req: &ResearchRequest) -> Result<EventStream> {
        let response = self
            .request(Method::POST, "/v1/research/stream")
            .json(req)
            .send()
            .await?;
        Ok(decode_response(Self::check_status(response)?))
    }

    /// Non-streaming fallback. The server reports failures in the body
    /// (with status 500), so both outcomes parse as `ResearchResponse`.
    pub async fn research_run(&self, req: &ResearchRequest) -> Result<ResearchResponse> {
        let response = self
            .request(Method::POST, "/v1/research/run")
            .json(req)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() || status.is_server_error() {
            Ok(response.json().await?)
        } else {
            Err(ClientError::Status(status))
        }
    }
}
