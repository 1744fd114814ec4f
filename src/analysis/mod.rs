//! Topic analysis passes
//!
//! Each pass reads the per-node embeddings of an [`ArgumentGraph`], computes
//! its results for the whole batch, and only then writes them back, so a
//! failing pass never leaves the graph half-populated.
//!
//! - [`metrics`]: similarity / distance to the anchor and to the predecessor
//! - [`projection`]: PCA to 2D coordinates for the topic map
//! - [`clustering`]: k-means cluster ids for the flow diagram

pub mod clustering;
pub mod metrics;
pub mod projection;

use crate::embed::{embed_checked, EmbedError, EmbeddingProvider};
use crate::graph::{AnalysisState, ArgumentGraph, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use clustering::cluster_graph;
pub use metrics::{compare_in_order, score_graph, ComparisonMode, MetricKind};
pub use projection::project_graph;

/// Analysis errors
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A pass ran before embeddings were attached
    #[error("Node {node_id} has no embedding")]
    MissingEmbedding { node_id: NodeId },

    #[error("Embedding of node {node_id} has {got} dimensions, expected {expected}")]
    DimensionMismatch {
        node_id: NodeId,
        expected: usize,
        got: usize,
    },

    #[error("Got {got} embeddings for {expected} nodes")]
    CountMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Embedding(#[from] EmbedError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Which numeric pass to run after embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// 2D projection for the topic-map scatter
    TopicMap,
    /// k-means cluster ids for the flow diagram
    Clusters,
    /// Anchor / predecessor metrics for the timeline
    Timeline,
}

/// Fetch embeddings for every node in one batch and attach them
pub async fn embed_graph(
    graph: &mut ArgumentGraph,
    provider: &dyn EmbeddingProvider,
) -> AnalysisResult<()> {
    let texts: Vec<String> = graph.nodes().map(|n| n.embedding_text().to_string()).collect();
    info!("Embedding {} nodes via {}", texts.len(), provider.name());

    let vectors = embed_checked(provider, &texts).await?;
    attach_embeddings(graph, vectors)
}

/// Attach one embedding per node (insertion order), replacing any previous
/// analysis state
pub fn attach_embeddings(graph: &mut ArgumentGraph, vectors: Vec<Vec<f32>>) -> AnalysisResult<()> {
    if vectors.len() != graph.node_count() {
        return Err(AnalysisError::CountMismatch {
            expected: graph.node_count(),
            got: vectors.len(),
        });
    }

    let expected = vectors.first().map(|v| v.len()).unwrap_or(0);
    for (node, vector) in graph.nodes().zip(vectors.iter()) {
        if vector.len() != expected {
            return Err(AnalysisError::DimensionMismatch {
                node_id: node.id.clone(),
                expected,
                got: vector.len(),
            });
        }
    }

    let states = vectors
        .into_iter()
        .map(|embedding| AnalysisState::Embedded { embedding })
        .collect();
    graph.commit_analysis(states);
    Ok(())
}

/// Run the pass selected by `mode` on an embedded graph
pub fn run_pass(graph: &mut ArgumentGraph, mode: AnalysisMode, num_clusters: usize) -> AnalysisResult<()> {
    match mode {
        AnalysisMode::TopicMap => project_graph(graph),
        AnalysisMode::Clusters => cluster_graph(graph, num_clusters).map(|_| ()),
        AnalysisMode::Timeline => score_graph(graph),
    }
}

/// Clone every node's embedding in insertion order.
///
/// Fails on the first node without an embedding, or whose length differs
/// from the first node's.
pub(crate) fn collect_embeddings(graph: &ArgumentGraph) -> AnalysisResult<Vec<Vec<f32>>> {
    let mut out = Vec::with_capacity(graph.node_count());
    let mut expected = None;

    for node in graph.nodes() {
        let embedding = node.embedding().ok_or_else(|| AnalysisError::MissingEmbedding {
            node_id: node.id.clone(),
        })?;

        let dims = *expected.get_or_insert(embedding.len());
        if embedding.len() != dims {
            return Err(AnalysisError::DimensionMismatch {
                node_id: node.id.clone(),
                expected: dims,
                got: embedding.len(),
            });
        }
        out.push(embedding.to_vec());
    }

    Ok(out)
}
