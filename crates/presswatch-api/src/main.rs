// Presswatch API server
// Decision: thin HTTP layer over the research engine and Postgres store.
// All /v1 routes run behind the auth middleware; health and docs stay open.

mod auth;
mod messages;
mod research;
mod sessions;
mod users;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, middleware, routing::get, Json, Router};
use presswatch_contracts::*;
use presswatch_research::{ResearchEngine, ScriptedEngine};
use presswatch_storage::Database;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    auth_mode: String,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        auth_mode: state.auth_mode.clone(),
    })
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    auth_mode: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        users::sync_user,
        sessions::create_session,
        sessions::list_sessions,
        sessions::delete_session,
        messages::create_message,
        messages::list_messages,
        research::stream_research,
        research::run_research,
    ),
    components(
        schemas(
            User, SyncUserRequest,
            ChatSession, CreateSessionRequest,
            ChatMessage, MessageRole, CreateMessageRequest,
            ResearchRequest, ResearchResponse,
            ListResponse<ChatSession>,
            ListResponse<ChatMessage>,
        )
    ),
    tags(
        (name = "users", description = "User identity sync endpoints"),
        (name = "sessions", description = "Chat session management endpoints"),
        (name = "messages", description = "Message management endpoints"),
        (name = "research", description = "Press research endpoints (SSE and fallback)")
    ),
    info(
        title = "Presswatch API",
        version = "0.2.0",
        description = "API for press monitoring research, chat sessions, and message history",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presswatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    tracing::info!("presswatch-api starting...");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Connected to database");

    let db = Arc::new(db);

    // Load authentication configuration
    let auth_config = auth::AuthConfig::from_env();
    tracing::info!(mode = ?auth_config.mode, "Authentication configured");
    let auth_state = auth::AuthState::new(auth_config.clone());

    // Research engine. The scripted engine walks the configured source
    // list; PRESS_SOURCES overrides the defaults.
    let engine: Arc<dyn ResearchEngine> = match std::env::var("PRESS_SOURCES") {
        Ok(s) if !s.is_empty() => Arc::new(ScriptedEngine::with_sources(
            s.split(',').map(|s| s.trim().to_string()).collect(),
        )),
        _ => Arc::new(ScriptedEngine::new()),
    };

    // Create module-specific states
    let users_state = users::AppState::new(db.clone());
    let sessions_state = sessions::AppState::new(db.clone());
    let messages_state = messages::AppState::new(db.clone());
    let research_state = research::AppState::new(engine);
    let health_state = HealthState {
        auth_mode: format!("{:?}", auth_config.mode),
    };

    // Load API prefix from environment (default: empty)
    // Example: API_PREFIX="/api" results in routes like /api/v1/sessions
    let api_prefix = std::env::var("API_PREFIX").unwrap_or_default();
    if !api_prefix.is_empty() {
        tracing::info!(prefix = %api_prefix, "API prefix configured");
    }

    // Load CORS allowed origins from environment (optional)
    // Only needed when UI is served from a different origin than the API
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build API routes; everything under /v1 requires authentication
    let api_routes = Router::new()
        .merge(users::routes(users_state))
        .merge(sessions::routes(sessions_state))
        .merge(messages::routes(messages_state))
        .merge(research::routes(research_state))
        .layer(middleware::from_fn_with_state(
            auth_state,
            auth::require_auth,
        ));

    // Build main router with health (not prefixed) and prefixed API routes
    let mut app = Router::new().route("/health", get(health).with_state(health_state));
    app = app.merge(build_router_with_prefix(api_routes, &api_prefix));

    // Add Swagger UI
    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::CACHE_CONTROL,
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
