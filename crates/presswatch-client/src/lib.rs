// Rust client for the Presswatch API
//
// Wraps the HTTP surface (user sync, sessions, messages, research) and
// carries the conversation state machine the UI drives: live activity
// timeline, per-message timeline history, and the streaming-with-fallback
// submit flow.

pub mod api;
pub mod conversation;
pub mod error;
pub mod locale;
pub mod stream;
pub mod timeline;

pub use api::ApiClient;
pub use conversation::{CancelToken, Conversation, LocalMessage, Phase};
pub use error::{ClientError, Result};
pub use stream::EventStream;
pub use timeline::ProcessedEvent;
