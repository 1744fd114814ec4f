//! Topicflow
//!
//! Topic-drift analysis and diagram rendering for argument graphs extracted
//! from conversations.
//!
//! # Architecture
//!
//! - [`graph`]: argument graph model (nodes, edges, per-node analysis state)
//! - [`extract`]: conversation text to graph via an LLM prompt
//! - [`embed`]: node text to vectors via an embedding provider
//! - [`analysis`]: anchor/predecessor metrics, 2D projection, clustering
//! - [`render`]: color mapping, Vega-Lite charts and Mermaid flowcharts
//! - [`pipeline`]: extraction, embedding and one analysis pass per run
//! - [`http`]: JSON API and viewer page
//!
//! ## Example Usage
//!
//! ```rust
//! use topicflow::analysis::{attach_embeddings, score_graph, ComparisonMode, MetricKind};
//! use topicflow::graph::{ArgumentGraph, Edge, Node};
//! use topicflow::render::{render_timeline, TimelineColoring};
//!
//! let mut graph = ArgumentGraph::from_parts(
//!     vec![
//!         Node::new("n1", "issue", "Which database?").with_speaker("Alice").with_sequence(1),
//!         Node::new("n2", "position", "Postgres").with_speaker("Bob").with_sequence(2),
//!     ],
//!     vec![Edge::new("n2", "n1", "proposal")],
//! )
//! .unwrap();
//!
//! attach_embeddings(&mut graph, vec![vec![1.0, 0.0], vec![0.6, 0.8]]).unwrap();
//! score_graph(&mut graph).unwrap();
//!
//! let coloring = TimelineColoring {
//!     metric: MetricKind::Similarity,
//!     mode: ComparisonMode::Sequential,
//! };
//! assert!(render_timeline(&graph, coloring).is_some());
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod embed;
pub mod error;
pub mod extract;
pub mod graph;
pub mod http;
pub mod pipeline;
pub mod render;

// Re-export main types for convenience
pub use graph::{
    AnalysisState, ArgumentGraph, Edge, GraphError, GraphResult, Node, NodeId, NodeType, TopicMetrics,
};

pub use analysis::{AnalysisError, AnalysisMode, AnalysisResult, ComparisonMode, MetricKind};

pub use config::{AppConfig, ConfigError, LLMProvider};

pub use embed::{EmbedError, EmbeddingClient, EmbeddingProvider};

pub use extract::{ExtractError, ExtractionStrategy, IbisStrategy};

pub use render::{
    render_all, render_flow, render_timeline, render_topic_map, Diagrams, FlowDirection, MermaidDiagram,
    RenderOptions, TimelineColoring, VegaLiteSpec,
};

pub use pipeline::{Pipeline, Session};

pub use error::{Error, Result};

pub use http::HttpServer;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
