// Research stream wire types
//
// The streaming endpoint emits one JSON-encoded `StreamEvent` per SSE
// `data:` frame. The set of kinds is closed: `status`, `result`, `error`,
// `done`. Order matters for `status` events; a sequence carries at most
// one `result` and ends with exactly one `done` (or an abrupt close).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for both the streaming endpoint and the JSON fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResearchRequest {
    /// The user's query. Required.
    #[schema(example = "How is Azerbaijan covered in Turkish press this week?")]
    pub query: String,
    /// Analysis depth, 1 (quick scan) to 5 (exhaustive). Opaque to the
    /// transport; interpreted by the engine.
    #[serde(default = "default_effort")]
    pub effort: u8,
    /// Model identifier, passed through to the engine.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_effort() -> u8 {
    3
}

/// Response of the non-streaming fallback endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResearchResponse {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// A single event on the research stream.
///
/// Immutable once emitted; the consumer handles each exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Progress line for the activity timeline. Ordering is significant,
    /// the count is not.
    Status { message: String },
    /// The final report. At most one per request by design; the framing
    /// does not forbid more.
    Result { content: String },
    /// Terminal failure; no `result` will follow.
    Error { message: String },
    /// Terminal sentinel with no payload.
    Done,
}

impl StreamEvent {
    pub fn status(message: impl Into<String>) -> Self {
        StreamEvent::Status {
            message: message.into(),
        }
    }

    pub fn result(content: impl Into<String>) -> Self {
        StreamEvent::Result {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    /// Whether this event ends the sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error { .. } | StreamEvent::Done)
    }
}
