//! k-means cluster assignment for the flow diagram

use super::projection::to_matrix;
use super::{collect_embeddings, AnalysisResult};
use crate::graph::{AnalysisState, ArgumentGraph};
use topicflow_algorithms::{kmeans, KMeansConfig, KMeansResult};
use tracing::{debug, info};

/// Partition nodes into `k` topic clusters and mark the graph `Clustered`.
///
/// With fewer nodes than clusters every node lands in cluster 0.
pub fn cluster_graph(graph: &mut ArgumentGraph, k: usize) -> AnalysisResult<KMeansResult> {
    let embeddings = collect_embeddings(graph)?;
    let matrix = to_matrix(graph, &embeddings)?;
    let result = kmeans(&matrix, &KMeansConfig::new(k));

    if !result.fitted {
        info!(
            "Only {} nodes for {} clusters; using a single group",
            graph.node_count(),
            k
        );
    }

    let states = embeddings
        .into_iter()
        .zip(result.labels.iter())
        .map(|(embedding, &cluster_id)| AnalysisState::Clustered { embedding, cluster_id })
        .collect();
    graph.commit_analysis(states);

    debug!("Clustered {} nodes, inertia {:.4}", graph.node_count(), result.inertia);
    Ok(result)
}
