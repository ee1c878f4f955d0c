// End-to-end conversation flow against an in-process server.

use axum::{
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::post,
    Json, Router,
};
use futures::{stream, StreamExt};
use presswatch_client::{ApiClient, CancelToken, Conversation, Phase};
use presswatch_contracts::{
    ChatMessage, CreateMessageRequest, MessageRole, ResearchRequest, ResearchResponse, StreamEvent,
};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sse_response(
    events: Vec<StreamEvent>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let frames = events.into_iter().map(|e| {
        Ok(Event::default().data(serde_json::to_string(&e).unwrap()))
    });
    Sse::new(stream::iter(frames))
}

#[tokio::test]
async fn test_successful_run_lands_report_and_archives_timeline() {
    let app = Router::new().route(
        "/v1/research/stream",
        post(|| async {
            sse_response(vec![
                StreamEvent::status("Searching (1/2): Turkish press coverage"),
                StreamEvent::status("Analyzing sentiment across collected articles"),
                StreamEvent::result("REPORT"),
                StreamEvent::Done,
            ])
        }),
    );
    let base_url = serve(app).await;

    let mut convo = Conversation::new(ApiClient::new(base_url));
    let phase = convo.submit("Baku energy coverage", &CancelToken::new()).await;

    assert_eq!(phase, Phase::Completed);
    assert_eq!(convo.transcript.len(), 2);
    assert_eq!(convo.transcript[0].role, MessageRole::User);
    assert_eq!(convo.transcript[1].role, MessageRole::Assistant);
    assert_eq!(convo.transcript[1].content, "REPORT");

    // Timeline moved from live to the archive, keyed by the new message.
    assert!(convo.live_timeline.is_empty());
    let archived = convo.history.get(&convo.transcript[1].id).unwrap();
    assert_eq!(archived.len(), 2);
    assert_eq!(archived[0].title, "Searching Press Sources");
    assert_eq!(archived[1].title, "Sentiment Analysis");
}

#[tokio::test]
async fn test_error_event_fails_hard_without_fallback() {
    let fallback_calls = Arc::new(Mutex::new(0u32));
    let calls = fallback_calls.clone();

    let app = Router::new()
        .route(
            "/v1/research/stream",
            post(|| async {
                sse_response(vec![
                    StreamEvent::status("Initializing press monitor..."),
                    StreamEvent::error("engine offline"),
                ])
            }),
        )
        .route(
            "/v1/research/run",
            post(move || {
                let calls = calls.clone();
                async move {
                    *calls.lock().unwrap() += 1;
                    Json(ResearchResponse::ok("should not be used"))
                }
            }),
        );
    let base_url = serve(app).await;

    let mut convo = Conversation::new(ApiClient::new(base_url));
    let phase = convo.submit("anything", &CancelToken::new()).await;

    assert_eq!(phase, Phase::Failed);
    assert_eq!(*fallback_calls.lock().unwrap(), 0);
    assert!(convo.live_timeline.is_empty());

    let last = convo.transcript.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert!(last.content.contains("engine offline"));
}

#[tokio::test]
async fn test_connection_failure_falls_back_exactly_once_with_same_payload() {
    let recorded = Arc::new(Mutex::new(Vec::<ResearchRequest>::new()));
    let sink = recorded.clone();

    let app = Router::new()
        .route(
            "/v1/research/stream",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/v1/research/run",
            post(move |Json(req): Json<ResearchRequest>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(req);
                    Json(ResearchResponse::ok("FALLBACK REPORT"))
                }
            }),
        );
    let base_url = serve(app).await;

    let mut convo = Conversation::new(ApiClient::new(base_url)).with_effort(5);
    let phase = convo.submit("corridor coverage", &CancelToken::new()).await;

    assert_eq!(phase, Phase::Completed);
    assert_eq!(convo.transcript.last().unwrap().content, "FALLBACK REPORT");

    let requests = recorded.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query, "corridor coverage");
    assert_eq!(requests[0].effort, 5);
}

#[tokio::test]
async fn test_failed_fallback_produces_visible_error_message() {
    let app = Router::new()
        .route(
            "/v1/research/stream",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/v1/research/run",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ResearchResponse::err("no sources reachable")),
                )
            }),
        );
    let base_url = serve(app).await;

    let mut convo = Conversation::new(ApiClient::new(base_url));
    let phase = convo.submit("anything", &CancelToken::new()).await;

    assert_eq!(phase, Phase::Failed);
    let last = convo.transcript.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert!(last.content.contains("no sources reachable"));
}

#[tokio::test]
async fn test_cancel_aborts_stream_and_discards_partial_timeline() {
    // One status, then the stream hangs.
    let app = Router::new().route(
        "/v1/research/stream",
        post(|| async {
            let hanging = stream::iter(vec![Ok::<_, Infallible>(
                Event::default().data(
                    serde_json::to_string(&StreamEvent::status(
                        "Initializing press monitor...",
                    ))
                    .unwrap(),
                ),
            )])
            .chain(stream::pending());
            Sse::new(hanging)
        }),
    );
    let base_url = serve(app).await;

    let cancel = CancelToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move {
        let mut convo = Conversation::new(ApiClient::new(base_url));
        let phase = convo.submit("anything", &token).await;
        (convo, phase)
    });

    // Let the first status land, then cancel.
    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();

    let (convo, phase) = handle.await.unwrap();
    assert_eq!(phase, Phase::Idle);
    assert!(convo.live_timeline.is_empty());
    assert!(convo.history.is_empty());
    // Only the user's own message remains.
    assert_eq!(convo.transcript.len(), 1);
    assert_eq!(convo.transcript[0].role, MessageRole::User);
}

#[tokio::test]
async fn test_attached_session_persists_transcript() {
    let session_id = uuid::Uuid::now_v7();
    let persisted = Arc::new(Mutex::new(Vec::<CreateMessageRequest>::new()));
    let sink = persisted.clone();

    let app = Router::new()
        .route(
            "/v1/research/stream",
            post(|| async {
                sse_response(vec![
                    StreamEvent::status("Generating digest..."),
                    StreamEvent::result("REPORT"),
                    StreamEvent::Done,
                ])
            }),
        )
        .route(
            "/v1/sessions/:session_id/messages",
            post(move |Json(req): Json<CreateMessageRequest>| {
                let sink = sink.clone();
                async move {
                    let message = ChatMessage {
                        id: uuid::Uuid::now_v7(),
                        session_id,
                        role: req.role,
                        content: req.content.clone(),
                        metadata: req.metadata.clone(),
                        created_at: chrono::Utc::now(),
                    };
                    sink.lock().unwrap().push(req);
                    (StatusCode::CREATED, Json(message))
                }
            }),
        );
    let base_url = serve(app).await;

    let mut convo = Conversation::new(ApiClient::new(base_url)).with_session(session_id);
    let phase = convo.submit("Baku energy coverage", &CancelToken::new()).await;

    assert_eq!(phase, Phase::Completed);
    let persisted = persisted.lock().unwrap();
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted[0].role, MessageRole::User);
    assert_eq!(persisted[0].content, "Baku energy coverage");
    assert_eq!(persisted[1].role, MessageRole::Assistant);
    assert_eq!(persisted[1].content, "REPORT");
}

#[tokio::test]
async fn test_close_after_result_without_done_completes() {
    // Some producers drop the connection right after the report instead
    // of sending `done`; that still counts as a successful run.
    let app = Router::new().route(
        "/v1/research/stream",
        post(|| async {
            sse_response(vec![
                StreamEvent::status("Generating digest..."),
                StreamEvent::result("REPORT"),
            ])
        }),
    );
    let base_url = serve(app).await;

    let mut convo = Conversation::new(ApiClient::new(base_url));
    let phase = convo.submit("anything", &CancelToken::new()).await;

    assert_eq!(phase, Phase::Completed);
    assert_eq!(convo.transcript.len(), 2);
    let last = convo.transcript.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert_eq!(last.content, "REPORT");
    assert!(convo.history.contains_key(&last.id));
}

#[tokio::test]
async fn test_abrupt_close_without_terminal_event_fails() {
    let app = Router::new().route(
        "/v1/research/stream",
        post(|| async {
            sse_response(vec![StreamEvent::status("Initializing press monitor...")])
        }),
    );
    let base_url = serve(app).await;

    let mut convo = Conversation::new(ApiClient::new(base_url));
    let phase = convo.submit("anything", &CancelToken::new()).await;

    assert_eq!(phase, Phase::Failed);
    assert_eq!(
        convo.transcript.last().unwrap().content,
        "Connection lost before the report arrived"
    );
}
