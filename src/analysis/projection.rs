//! 2D projection for the topic map

use super::{collect_embeddings, AnalysisError, AnalysisResult};
use crate::graph::{AnalysisState, ArgumentGraph};
use topicflow_algorithms::{project_2d, EmbeddingMatrix, MatrixError, PcaConfig};
use tracing::debug;

/// Project every node's embedding to 2D with PCA fitted on the whole graph.
///
/// A graph with fewer than two nodes gets `[0.0, 0.0]` everywhere.
pub fn project_graph(graph: &mut ArgumentGraph) -> AnalysisResult<()> {
    let embeddings = collect_embeddings(graph)?;
    let matrix = to_matrix(graph, &embeddings)?;
    let positions = project_2d(&matrix, &PcaConfig::default());

    let states = embeddings
        .into_iter()
        .zip(positions)
        .map(|(embedding, position)| AnalysisState::Projected { embedding, position })
        .collect();
    graph.commit_analysis(states);

    debug!("Projected {} nodes", graph.node_count());
    Ok(())
}

pub(crate) fn to_matrix(graph: &ArgumentGraph, embeddings: &[Vec<f32>]) -> AnalysisResult<EmbeddingMatrix> {
    EmbeddingMatrix::from_rows(embeddings).map_err(|e| match e {
        MatrixError::DimensionMismatch { row, expected, got } => AnalysisError::DimensionMismatch {
            node_id: graph
                .node_at(row)
                .map(|n| n.id.clone())
                .unwrap_or_else(|| row.to_string().into()),
            expected,
            got,
        },
    })
}
