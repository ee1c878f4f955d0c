// ResearchEngine - the seam between transport and analysis
//
// Implementations can:
// - Call a real search/analysis backend
// - Replay a scripted run for demos and tests
// - Wrap another engine to add caching or rate limits
//
// The transport suspends on the engine's stream; there are no timers in
// the protocol layer. An engine that does real work simply takes as long
// as its downstream calls take.

use futures::Stream;
use std::pin::Pin;

use crate::error::Result;

/// One unit of work requested from an engine.
#[derive(Debug, Clone)]
pub struct ResearchJob {
    pub query: String,
    /// Analysis depth, 1..=5.
    pub effort: u8,
    /// Model identifier, engine-specific.
    pub model: Option<String>,
}

impl ResearchJob {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            effort: 3,
            model: None,
        }
    }
}

/// Updates yielded while a run executes.
///
/// A well-behaved engine yields zero or more `Progress` items followed by
/// exactly one `Report`, then ends the stream. Ending without a `Report`
/// is an engine failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ResearchUpdate {
    /// A human-readable progress line, in emission order.
    Progress(String),
    /// The final report content.
    Report(String),
}

/// Type alias for the stream of updates produced by a run
pub type UpdateStream = Pin<Box<dyn Stream<Item = Result<ResearchUpdate>> + Send>>;

/// Trait for research backends
pub trait ResearchEngine: Send + Sync {
    /// Start a run and return its update stream.
    fn run(&self, job: ResearchJob) -> UpdateStream;
}
