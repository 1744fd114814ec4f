//! End-to-end orchestration
//!
//! Text goes through extraction, then (optionally) embedding and one
//! analysis pass. The pipeline holds only its collaborators; every run
//! returns a fresh [`Session`] that owns the resulting graph.

use crate::analysis::{embed_graph, run_pass, AnalysisMode};
use crate::config::{AnalysisConfig, AppConfig};
use crate::embed::{EmbeddingClient, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::extract::{ExtractionStrategy, IbisStrategy};
use crate::graph::ArgumentGraph;
use crate::render::{render_all, Diagrams, RenderOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one run: the graph plus what happened to its numeric step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub graph: ArgumentGraph,
    /// Pass that populated the graph's analysis state, if any
    pub mode: Option<AnalysisMode>,
    /// Why the numeric step did not complete, if it was attempted and failed
    pub analysis_error: Option<String>,
}

impl Session {
    pub fn new(graph: ArgumentGraph) -> Self {
        Self {
            graph,
            mode: None,
            analysis_error: None,
        }
    }

    /// Whether an analysis pass has been committed to the graph
    pub fn is_analyzed(&self) -> bool {
        self.mode.is_some()
    }

    pub fn render(&self, options: &RenderOptions) -> Diagrams {
        render_all(&self.graph, options)
    }
}

pub struct Pipeline {
    extractor: Arc<dyn ExtractionStrategy>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn ExtractionStrategy>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            extractor,
            embedder,
            config,
        }
    }

    /// Build the HTTP-backed (or mock) collaborators named in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let extractor = IbisStrategy::new(&config.llm)?;
        let embedder = EmbeddingClient::new(&config.embedding)?;
        Ok(Self::new(Arc::new(extractor), Arc::new(embedder), config.analysis.clone()))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Extract a graph without any numeric analysis
    pub async fn extract(&self, text: &str) -> Result<Session> {
        info!("Extracting with {} strategy", self.extractor.name());
        let graph = self.extractor.analyze(text).await?;
        info!("Extracted {} nodes and {} edges", graph.node_count(), graph.edge_count());
        Ok(Session::new(graph))
    }

    /// Embed the session's graph and run one pass on it.
    ///
    /// Works on a copy and swaps it in only when both steps succeed, so on
    /// error the session graph is exactly what it was before.
    pub async fn analyze(&self, session: &mut Session, mode: AnalysisMode) -> Result<()> {
        let mut graph = session.graph.clone();
        embed_graph(&mut graph, self.embedder.as_ref()).await?;
        run_pass(&mut graph, mode, self.config.num_clusters)?;

        info!("Committed {:?} analysis for {} nodes", mode, graph.node_count());
        session.graph = graph;
        session.mode = Some(mode);
        session.analysis_error = None;
        Ok(())
    }

    /// Extract, then analyze with the configured mode when topic analysis is
    /// enabled
    pub async fn run(&self, text: &str) -> Result<Session> {
        let mode = self.config.topic_analysis.then_some(self.config.mode);
        self.run_with_mode(text, mode).await
    }

    /// Extract, then run `mode` if given.
    ///
    /// Extraction failure is returned as an error. An embedding failure is
    /// recorded on the session, which keeps the structural graph.
    pub async fn run_with_mode(&self, text: &str, mode: Option<AnalysisMode>) -> Result<Session> {
        let mut session = self.extract(text).await?;
        let mode = match mode {
            Some(mode) if !session.graph.is_empty() => mode,
            _ => return Ok(session),
        };

        match self.analyze(&mut session, mode).await {
            Ok(()) => {}
            Err(Error::EmbeddingFailed(reason)) => {
                warn!("Topic analysis skipped: {}", reason);
                session.analysis_error = Some(reason);
            }
            Err(other) => return Err(other),
        }
        Ok(session)
    }
}

/// Run one pass on a graph whose nodes already carry embeddings
pub fn reanalyze(graph: &mut ArgumentGraph, mode: AnalysisMode, num_clusters: usize) -> Result<()> {
    let mut scratch = graph.clone();
    run_pass(&mut scratch, mode, num_clusters)?;
    *graph = scratch;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LLMProvider;
    use crate::embed::{EmbedError, EmbedResult};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl EmbeddingProvider for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn embed(&self, _texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
            Err(EmbedError::NetworkError("connection refused".to_string()))
        }
    }

    fn mock_config(mode: AnalysisMode) -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.provider = LLMProvider::Mock;
        config.embedding.provider = LLMProvider::Mock;
        config.analysis.mode = mode;
        config.analysis.num_clusters = 2;
        config
    }

    const TEXT: &str = "Alice: Which database should we use?\n\
                        Bob: Postgres, it is what we know.\n\
                        Carol: But licensing costs are a concern.\n\
                        Alice: We decided to go with Postgres.";

    #[tokio::test]
    async fn test_run_with_mock_providers() {
        let pipeline = Pipeline::from_config(&mock_config(AnalysisMode::TopicMap)).unwrap();
        let session = pipeline.run(TEXT).await.unwrap();

        assert_eq!(session.mode, Some(AnalysisMode::TopicMap));
        assert!(session.analysis_error.is_none());
        assert!(session.graph.nodes().all(|n| n.position().is_some()));
    }

    #[tokio::test]
    async fn test_embedding_failure_keeps_graph() {
        let config = mock_config(AnalysisMode::Timeline);
        let extractor = IbisStrategy::new(&config.llm).unwrap();
        let pipeline = Pipeline::new(Arc::new(extractor), Arc::new(Unreachable), config.analysis);

        let session = pipeline.run(TEXT).await.unwrap();
        assert!(session.graph.node_count() > 0);
        assert!(session.mode.is_none());
        assert!(session.analysis_error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_disabled_analysis() {
        let mut config = mock_config(AnalysisMode::Clusters);
        config.analysis.topic_analysis = false;
        let pipeline = Pipeline::from_config(&config).unwrap();

        let session = pipeline.run(TEXT).await.unwrap();
        assert!(!session.is_analyzed());
        assert!(session.graph.nodes().all(|n| n.analysis.is_unanalyzed()));
    }

    #[tokio::test]
    async fn test_empty_text_fails_extraction() {
        let pipeline = Pipeline::from_config(&mock_config(AnalysisMode::TopicMap)).unwrap();
        let err = pipeline.run("   ").await.unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[test]
    fn test_reanalyze_without_embeddings_is_untouched() {
        let mut graph = ArgumentGraph::from_parts(
            vec![crate::graph::Node::new("n1", "issue", "Q")],
            vec![],
        )
        .unwrap();
        let err = reanalyze(&mut graph, AnalysisMode::Timeline, 3).unwrap_err();
        assert!(matches!(err, Error::MissingEmbedding { .. }));
        assert!(graph.nodes().all(|n| n.analysis.is_unanalyzed()));
    }
}
