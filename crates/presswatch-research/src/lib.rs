// Research engine seam
//
// The streaming and fallback endpoints both drive a ResearchEngine. The
// engine yields progress lines while it works and finishes with a report;
// the transport layer maps those onto the SSE wire format. The scripted
// engine stands in for the real search/analysis pipeline.

pub mod engine;
pub mod error;
pub mod prompt;
pub mod scripted;

pub use engine::{ResearchEngine, ResearchJob, ResearchUpdate, UpdateStream};
pub use error::{EngineError, Result};
pub use prompt::build_research_prompt;
pub use scripted::ScriptedEngine;
