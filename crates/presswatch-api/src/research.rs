// Research HTTP routes: SSE stream and JSON fallback
//
// Both endpoints drive the configured ResearchEngine. The stream maps
// engine updates onto `StreamEvent` frames; the fallback drains the run
// and returns the report in one JSON response.
//
// Channel termination is structural: a single writer task owns the
// sender, forwards non-terminal events, and sends exactly one terminal
// event (`done` or `error`) before it drops the sender and the response
// body closes.

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::post,
    Json, Router,
};
use futures::{Stream, StreamExt};
use presswatch_contracts::{ResearchRequest, ResearchResponse, StreamEvent};
use presswatch_research::{ResearchEngine, ResearchJob, ResearchUpdate};
use std::{convert::Infallible, sync::Arc};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// App state for research routes
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn ResearchEngine>,
}

impl AppState {
    pub fn new(engine: Arc<dyn ResearchEngine>) -> Self {
        Self { engine }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/research/stream", post(stream_research))
        .route("/v1/research/run", post(run_research))
        .with_state(state)
}

fn job_from_request(req: ResearchRequest) -> ResearchJob {
    ResearchJob {
        query: req.query,
        effort: req.effort,
        model: req.model,
    }
}

/// POST /v1/research/stream - Run research, streaming progress as SSE
///
/// Emits zero or more `status` events, then one `result`, then `done`.
/// If the engine fails before producing a report, the stream ends with a
/// single `error` event instead.
#[utoipa::path(
    post,
    path = "/v1/research/stream",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream"),
        (status = 401, description = "Unauthenticated")
    ),
    tag = "research"
)]
pub async fn stream_research(
    State(state): State<AppState>,
    Json(req): Json<ResearchRequest>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let (tx, rx) = mpsc::channel::<StreamEvent>(16);
    let engine = state.engine.clone();

    tokio::spawn(async move {
        let terminal = forward_updates(engine, job_from_request(req), &tx).await;
        // The receiver may already be gone if the client disconnected.
        let _ = tx.send(terminal).await;
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        let json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Ok(SseEvent::default().data(json))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Drive the engine, forwarding non-terminal events; returns the terminal
/// event for this run.
async fn forward_updates(
    engine: Arc<dyn ResearchEngine>,
    job: ResearchJob,
    tx: &mpsc::Sender<StreamEvent>,
) -> StreamEvent {
    let mut updates = engine.run(job);
    let mut reported = false;

    while let Some(update) = updates.next().await {
        let event = match update {
            Ok(ResearchUpdate::Progress(message)) => StreamEvent::status(message),
            Ok(ResearchUpdate::Report(content)) => {
                reported = true;
                StreamEvent::result(content)
            }
            Err(e) => {
                tracing::warn!("Research run failed: {}", e);
                return StreamEvent::error(e.to_string());
            }
        };
        if tx.send(event).await.is_err() {
            // Client went away; nothing left to terminate.
            return StreamEvent::Done;
        }
    }

    if reported {
        StreamEvent::Done
    } else {
        tracing::warn!("Engine finished without producing a report");
        StreamEvent::error("research finished without a result")
    }
}

/// POST /v1/research/run - Non-streaming fallback
///
/// Used by clients whose streaming connection could not be established.
/// Drains the run and returns only the final report.
#[utoipa::path(
    post,
    path = "/v1/research/run",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research completed", body = ResearchResponse),
        (status = 500, description = "Research failed", body = ResearchResponse),
        (status = 401, description = "Unauthenticated")
    ),
    tag = "research"
)]
pub async fn run_research(
    State(state): State<AppState>,
    Json(req): Json<ResearchRequest>,
) -> (StatusCode, Json<ResearchResponse>) {
    let mut updates = state.engine.run(job_from_request(req));
    let mut report = None;

    while let Some(update) = updates.next().await {
        match update {
            Ok(ResearchUpdate::Report(content)) => report = Some(content),
            Ok(ResearchUpdate::Progress(_)) => {}
            Err(e) => {
                tracing::warn!("Research run failed: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ResearchResponse::err(e.to_string())),
                );
            }
        }
    }

    match report {
        Some(content) => (StatusCode::OK, Json(ResearchResponse::ok(content))),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ResearchResponse::err("research finished without a result")),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use presswatch_research::ScriptedEngine;
    use tower::ServiceExt;

    fn app(engine: ScriptedEngine) -> Router {
        routes(AppState::new(Arc::new(engine)))
    }

    fn research_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"query": "Baku energy coverage", "effort": 2}"#,
            ))
            .unwrap()
    }

    /// Parse SSE frames out of a collected response body.
    fn parse_frames(body: &str) -> Vec<StreamEvent> {
        body.split("\n\n")
            .filter_map(|frame| frame.trim().strip_prefix("data: "))
            .map(|payload| serde_json::from_str(payload).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_stream_emits_statuses_result_then_done() {
        let engine = ScriptedEngine::with_sources(vec!["Turkish".to_string()]);
        let response = app(engine)
            .oneshot(research_request("/v1/research/stream"))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let events = parse_frames(std::str::from_utf8(&body).unwrap());

        assert!(events.len() >= 3);
        assert!(matches!(events[0], StreamEvent::Status { .. }));
        let result_count = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::Result { .. }))
            .count();
        assert_eq!(result_count, 1);
        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_stream_failure_terminates_with_single_error() {
        let engine = ScriptedEngine::failing("upstream index offline");
        let response = app(engine)
            .oneshot(research_request("/v1/research/stream"))
            .await
            .unwrap();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let events = parse_frames(std::str::from_utf8(&body).unwrap());

        let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminals.len(), 1);
        match events.last().unwrap() {
            StreamEvent::Error { message } => {
                assert!(message.contains("upstream index offline"))
            }
            other => panic!("expected terminal error, got {:?}", other),
        }
        assert!(!events
            .iter()
            .any(|e| matches!(e, StreamEvent::Result { .. })));
    }

    #[tokio::test]
    async fn test_run_returns_report_json() {
        let engine = ScriptedEngine::with_sources(vec!["Turkish".to_string()]);
        let response = app(engine)
            .oneshot(research_request("/v1/research/run"))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: ResearchResponse = serde_json::from_slice(&body).unwrap();
        assert!(parsed.success);
        assert!(parsed.result.unwrap().contains("Baku energy coverage"));
    }

    #[tokio::test]
    async fn test_run_failure_reports_unsuccessful() {
        let engine = ScriptedEngine::failing("no sources reachable");
        let response = app(engine)
            .oneshot(research_request("/v1/research/run"))
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: ResearchResponse = serde_json::from_slice(&body).unwrap();
        assert!(!parsed.success);
        assert!(parsed.error.unwrap().contains("no sources reachable"));
    }
}
