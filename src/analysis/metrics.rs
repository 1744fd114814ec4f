//! Anchor and predecessor comparison
//!
//! One pass computes all four scores per node (cosine similarity and
//! Euclidean distance, each against the anchor and against the previous
//! node in sequence order). Which one drives the timeline colors is picked
//! at render time via [`MetricKind`] and [`ComparisonMode`].

use super::{collect_embeddings, AnalysisResult};
use crate::graph::{AnalysisState, ArgumentGraph, TopicMetrics};
use serde::{Deserialize, Serialize};
use topicflow_algorithms::{cosine_similarity, euclidean_distance};
use tracing::debug;

/// Scalar relationship between two embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Cosine similarity, higher is closer
    Similarity,
    /// Euclidean distance, lower is closer
    Distance,
}

/// What each node is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// The first node in sequence order
    ReferencePoint,
    /// The immediately preceding node in sequence order
    Sequential,
}

impl TopicMetrics {
    /// Pick one of the four scores
    pub fn select(&self, metric: MetricKind, mode: ComparisonMode) -> f64 {
        match (metric, mode) {
            (MetricKind::Similarity, ComparisonMode::ReferencePoint) => self.similarity_to_first,
            (MetricKind::Distance, ComparisonMode::ReferencePoint) => self.distance_to_first,
            (MetricKind::Similarity, ComparisonMode::Sequential) => self.similarity_to_previous,
            (MetricKind::Distance, ComparisonMode::Sequential) => self.distance_to_previous,
        }
    }
}

/// Score embeddings given in conversation order.
///
/// The first entry is the anchor and its own predecessor, so it always
/// gets [`TopicMetrics::IDENTITY`] whatever its vector looks like.
pub fn compare_in_order(embeddings: &[&[f32]]) -> Vec<TopicMetrics> {
    let Some(anchor) = embeddings.first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(embeddings.len());
    out.push(TopicMetrics::IDENTITY);

    for pair in embeddings.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        out.push(TopicMetrics {
            similarity_to_first: cosine_similarity(current, anchor),
            distance_to_first: euclidean_distance(current, anchor),
            similarity_to_previous: cosine_similarity(current, previous),
            distance_to_previous: euclidean_distance(current, previous),
        });
    }

    out
}

/// Compute [`TopicMetrics`] for every node and mark the graph `Scored`.
///
/// Order is [`ArgumentGraph::sequence_order`]. Fails with
/// `MissingEmbedding` before touching the graph if any node lacks a vector.
pub fn score_graph(graph: &mut ArgumentGraph) -> AnalysisResult<()> {
    let embeddings = collect_embeddings(graph)?;
    let order = graph.sequence_order();

    let ordered: Vec<&[f32]> = order.iter().map(|&idx| embeddings[idx].as_slice()).collect();
    let scored = compare_in_order(&ordered);

    let mut metrics = vec![TopicMetrics::IDENTITY; embeddings.len()];
    for (&idx, m) in order.iter().zip(scored) {
        metrics[idx] = m;
    }

    let states = embeddings
        .into_iter()
        .zip(metrics)
        .map(|(embedding, metrics)| AnalysisState::Scored { embedding, metrics })
        .collect();
    graph.commit_analysis(states);

    debug!("Scored {} nodes", graph.node_count());
    Ok(())
}
