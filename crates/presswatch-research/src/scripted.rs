// Scripted engine - replays a canned research run
//
// Stands in for the real search/analysis pipeline in demos and tests.
// The phases mirror what the production pipeline reports: initialization,
// per-source search, sentiment analysis, digest generation.

use futures::stream;

use crate::engine::{ResearchEngine, ResearchJob, ResearchUpdate, UpdateStream};
use crate::error::EngineError;
use crate::prompt::{build_research_prompt, PromptContext};

/// Engine that yields a fixed sequence of updates.
pub struct ScriptedEngine {
    sources: Vec<String>,
    /// When set, the run fails with this message instead of reporting.
    failure: Option<String>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            sources: vec![
                "Turkish".to_string(),
                "Russian".to_string(),
                "Iranian".to_string(),
                "Georgian".to_string(),
            ],
            failure: None,
        }
    }

    /// Script a run over the given source names.
    pub fn with_sources(sources: Vec<String>) -> Self {
        Self {
            sources,
            failure: None,
        }
    }

    /// Script a run that fails after its first progress line.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sources: Vec::new(),
            failure: Some(message.into()),
        }
    }

    fn script(&self, job: &ResearchJob) -> Vec<crate::error::Result<ResearchUpdate>> {
        let mut steps = vec![Ok(ResearchUpdate::Progress(
            "Initializing press monitor...".to_string(),
        ))];

        if let Some(msg) = &self.failure {
            steps.push(Err(EngineError::search(msg.clone())));
            return steps;
        }

        let total = self.sources.len();
        for (i, source) in self.sources.iter().enumerate() {
            steps.push(Ok(ResearchUpdate::Progress(format!(
                "Searching ({}/{}): {} press coverage",
                i + 1,
                total,
                source
            ))));
        }
        steps.push(Ok(ResearchUpdate::Progress(
            "Analyzing sentiment across collected articles".to_string(),
        )));
        steps.push(Ok(ResearchUpdate::Progress(
            "Generating digest...".to_string(),
        )));
        steps.push(Ok(ResearchUpdate::Report(render_digest(job, &self.sources))));
        steps
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchEngine for ScriptedEngine {
    fn run(&self, job: ResearchJob) -> UpdateStream {
        if job.query.trim().is_empty() {
            return Box::pin(stream::iter(vec![Err(EngineError::invalid_query(
                "query must not be empty",
            ))]));
        }
        Box::pin(stream::iter(self.script(&job)))
    }
}

/// Render the canned digest. The methodology section is taken from the
/// same prompt a model-backed engine would send for this job, so the
/// scripted output tracks the real prompt shape.
fn render_digest(job: &ResearchJob, sources: &[String]) -> String {
    let source_refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let prompt = build_research_prompt(&PromptContext {
        query: &job.query,
        target_countries: &[],
        source_countries: &source_refs,
        effort: job.effort,
        language: "en",
    });
    let depth = prompt
        .lines()
        .find(|line| line.starts_with("Analysis depth:"))
        .unwrap_or("Analysis depth: standard");

    format!(
        "## Executive Summary\n\nPress digest for \"{}\" across {} source groups.\n\n\
         ## Methodology\n\n{}\n\n## Key Findings\n\n- Coverage volume is stable week over week\n\
         - Energy and transit corridors dominate the agenda\n- Sentiment skews neutral-to-positive",
        job.query,
        sources.len(),
        depth
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn collect(engine: &ScriptedEngine, job: ResearchJob) -> Vec<ResearchUpdate> {
        engine
            .run(job)
            .filter_map(|r| async move { r.ok() })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_scripted_run_ends_with_one_report() {
        let engine = ScriptedEngine::new();
        let updates = collect(&engine, ResearchJob::new("Baku energy")).await;

        let reports: Vec<_> = updates
            .iter()
            .filter(|u| matches!(u, ResearchUpdate::Report(_)))
            .collect();
        assert_eq!(reports.len(), 1);
        assert!(matches!(updates.last(), Some(ResearchUpdate::Report(_))));
    }

    #[tokio::test]
    async fn test_scripted_progress_is_ordered() {
        let engine =
            ScriptedEngine::with_sources(vec!["Turkish".to_string(), "Russian".to_string()]);
        let updates = collect(&engine, ResearchJob::new("corridors")).await;

        let progress: Vec<_> = updates
            .iter()
            .filter_map(|u| match u {
                ResearchUpdate::Progress(m) => Some(m.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(progress[0], "Initializing press monitor...");
        assert!(progress[1].starts_with("Searching (1/2): Turkish"));
        assert!(progress[2].starts_with("Searching (2/2): Russian"));
    }

    #[tokio::test]
    async fn test_failing_engine_yields_error_without_report() {
        let engine = ScriptedEngine::failing("upstream index offline");
        let mut saw_error = false;
        let mut stream = engine.run(ResearchJob::new("anything"));
        while let Some(item) = stream.next().await {
            match item {
                Ok(ResearchUpdate::Report(_)) => panic!("failing engine must not report"),
                Ok(_) => {}
                Err(e) => {
                    assert!(e.to_string().contains("upstream index offline"));
                    saw_error = true;
                }
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_digest_methodology_follows_effort() {
        let engine = ScriptedEngine::new();

        let mut job = ResearchJob::new("Baku energy");
        job.effort = 1;
        let updates = collect(&engine, job).await;
        match updates.last() {
            Some(ResearchUpdate::Report(digest)) => {
                assert!(digest.contains("## Methodology"));
                assert!(digest.contains("Analysis depth: quick scan"));
            }
            other => panic!("expected report, got {:?}", other),
        }

        let updates = collect(&engine, ResearchJob::new("Baku energy")).await;
        match updates.last() {
            Some(ResearchUpdate::Report(digest)) => {
                assert!(digest.contains("Analysis depth: standard analysis"));
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let engine = ScriptedEngine::new();
        let mut stream = engine.run(ResearchJob::new("   "));
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(EngineError::InvalidQuery(_))));
    }
}
