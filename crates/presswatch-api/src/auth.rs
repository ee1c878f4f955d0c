// Authentication middleware
// Decision: The identity provider issues the tokens; this service only
// verifies them. No-auth mode exists for local development.
//
// Every /v1 route runs through `require_auth`. Verified identity lands in
// request extensions as `CurrentUser` before any handler touches data.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;

/// Authentication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No authentication required (local development)
    #[default]
    None,
    /// Bearer JWT from the identity provider required on every call
    Required,
}

impl AuthMode {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "required" | "full" => AuthMode::Required,
            _ => AuthMode::None,
        }
    }
}

/// Authentication configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Shared secret for HS256 token verification
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let mode = std::env::var("AUTH_MODE")
            .map(|s| AuthMode::from_str(&s))
            .unwrap_or_default();

        let jwt_secret = std::env::var("AUTH_JWT_SECRET").unwrap_or_else(|_| {
            if mode == AuthMode::Required {
                tracing::warn!("AUTH_JWT_SECRET not set, using insecure default");
            }
            "insecure-dev-secret-change-me".to_string()
        });

        Self { mode, jwt_secret }
    }
}

/// Shared auth state for the middleware
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
}

impl AuthState {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// The verified caller, available via request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Identity-provider subject claim
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CurrentUser {
    /// Fixed identity used when auth is disabled
    fn development() -> Self {
        Self {
            subject: "dev|local".to_string(),
            email: Some("dev@localhost".to_string()),
            name: Some("Local Developer".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[allow(dead_code)]
    exp: usize,
}

/// Middleware: reject unauthenticated calls before any data access.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = match auth.config.mode {
        AuthMode::None => CurrentUser::development(),
        AuthMode::Required => {
            let token = bearer_token(&request).ok_or(StatusCode::UNAUTHORIZED)?;
            verify_token(token, &auth.config.jwt_secret).ok_or(StatusCode::UNAUTHORIZED)?
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn verify_token(token: &str, secret: &str) -> Option<CurrentUser> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        e
    })
    .ok()?;

    Some(CurrentUser {
        subject: data.claims.sub,
        email: data.claims.email,
        name: data.claims.name,
    })
}
