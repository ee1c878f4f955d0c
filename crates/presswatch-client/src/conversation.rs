// Conversation state machine
//
// Drives one research conversation the way the UI does: submit a query,
// stream progress into the live timeline, land the report as an assistant
// message and archive the timeline under its id. When the streaming
// connection cannot be established the query is retried once against the
// JSON fallback endpoint with the identical payload. A stream-level
// `error` event is a hard failure and does not trigger the fallback.

use std::collections::HashMap;

use futures::StreamExt;
use presswatch_contracts::{CreateMessageRequest, MessageRole, ResearchRequest, StreamEvent};
use tokio::sync::watch;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::locale::ui_text;
use crate::timeline::{process_status, ProcessedEvent};

/// Where a conversation currently is in the submit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting,
    Streaming,
    FallingBack,
    Completed,
    Failed,
}

/// A message as the conversation layer holds it, before/without
/// persistence.
#[derive(Debug, Clone)]
pub struct LocalMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
}

/// Handle for aborting an in-flight submit. Clone it and call `cancel`
/// from another task; the read loop stops at the next event boundary.
#[derive(Clone)]
pub struct CancelToken {
    tx: watch::Sender<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Conversation {
    client: ApiClient,
    language: String,
    effort: u8,
    model: Option<String>,
    /// When set, messages are persisted to this session as they land.
    session: Option<Uuid>,
    pub phase: Phase,
    /// Messages in display order.
    pub transcript: Vec<LocalMessage>,
    /// Timeline of the run currently in flight.
    pub live_timeline: Vec<ProcessedEvent>,
    /// Completed timelines, keyed by the assistant message they produced.
    pub history: HashMap<Uuid, Vec<ProcessedEvent>>,
}

impl Conversation {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            language: "en".to_string(),
            effort: 3,
            model: None,
            session: None,
            phase: Phase::Idle,
            transcript: Vec::new(),
            live_timeline: Vec::new(),
            history: HashMap::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_effort(mut self, effort: u8) -> Self {
        self.effort = effort;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Persist transcript messages to an existing chat session.
    pub fn with_session(mut self, session_id: Uuid) -> Self {
        self.session = Some(session_id);
        self
    }

    /// Submit a query and drive it to a terminal phase (or `Idle` on
    /// cancellation). Returns the phase the run ended in.
    pub async fn submit(&mut self, query: impl Into<String>, cancel: &CancelToken) -> Phase {
        let query = query.into();
        self.push_message(MessageRole::User, query.clone()).await;
        self.live_timeline.clear();
        self.phase = Phase::Connecting;

        let request = ResearchRequest {
            query,
            effort: self.effort,
            model: self.model.clone(),
        };

        let mut events = match self.client.research_stream(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Stream connection failed, falling back: {}", e);
                self.fall_back(&request).await;
                return self.phase;
            }
        };

        self.phase = Phase::Streaming;
        let mut reported = false;

        let mut cancel_rx = cancel.subscribe();
        let cancelled = async move {
            loop {
                if *cancel_rx.borrow() {
                    return;
                }
                if cancel_rx.changed().await.is_err() {
                    // Token dropped; cancellation can no longer happen.
                    futures::future::pending::<()>().await;
                }
            }
        };
        tokio::pin!(cancelled);

        loop {
            let event = tokio::select! {
                _ = &mut cancelled => {
                    self.live_timeline.clear();
                    self.phase = Phase::Idle;
                    return self.phase;
                }
                event = events.next() => event,
            };

            match event {
                Some(StreamEvent::Status { message }) => {
                    self.live_timeline.push(process_status(&message));
                }
                Some(StreamEvent::Result { content }) => {
                    reported = true;
                    let id = self.push_message(MessageRole::Assistant, content).await;
                    self.history
                        .insert(id, std::mem::take(&mut self.live_timeline));
                }
                Some(StreamEvent::Error { message }) => {
                    self.fail(format!(
                        "{}: {}",
                        ui_text(&self.language, "research_failed"),
                        message
                    ))
                    .await;
                    return self.phase;
                }
                Some(StreamEvent::Done) | None => {
                    // `done` and an abrupt close both end the sequence;
                    // what matters is whether a report arrived first.
                    if reported {
                        self.phase = Phase::Completed;
                    } else {
                        self.fail(ui_text(&self.language, "connection_lost").to_string())
                            .await;
                    }
                    return self.phase;
                }
            }
        }
    }

    /// One retry against the JSON fallback endpoint, same payload.
    async fn fall_back(&mut self, request: &ResearchRequest) {
        self.phase = Phase::FallingBack;
        match self.client.research_run(request).await {
            Ok(response) if response.success => match response.result {
                Some(result) => {
                    self.push_message(MessageRole::Assistant, result).await;
                    self.phase = Phase::Completed;
                }
                None => {
                    self.fail(ui_text(&self.language, "connection_lost").to_string())
                        .await
                }
            },
            Ok(response) => {
                self.fail(format!(
                    "{}: {}",
                    ui_text(&self.language, "research_failed"),
                    response.error.unwrap_or_default()
                ))
                .await
            }
            Err(e) => {
                self.fail(format!(
                    "{}: {}",
                    ui_text(&self.language, "research_failed"),
                    e
                ))
                .await
            }
        }
    }

    /// Append to the transcript and persist when a session is attached.
    /// Persistence is best effort; a storage failure never interrupts the
    /// stream handling.
    async fn push_message(&mut self, role: MessageRole, content: String) -> Uuid {
        let id = Uuid::now_v7();
        self.transcript.push(LocalMessage {
            id,
            role,
            content: content.clone(),
        });

        if let Some(session_id) = self.session {
            let req = CreateMessageRequest {
                role,
                content,
                metadata: None,
            };
            if let Err(e) = self.client.create_message(session_id, &req).await {
                tracing::warn!("Failed to persist message: {}", e);
            }
        }
        id
    }

    /// Record the failure as a visible assistant message and discard the
    /// partial timeline.
    async fn fail(&mut self, message: String) {
        self.live_timeline.clear();
        self.push_message(MessageRole::Assistant, message).await;
        self.phase = Phase::Failed;
    }
}
