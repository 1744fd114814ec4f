//! Argument graph data model
//!
//! Nodes are utterances or claims extracted from a conversation, edges are
//! labeled argumentative relations between them. Numeric analysis results
//! are attached per node as an [`AnalysisState`].

pub mod edge;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::{AnalysisState, Node, TopicMetrics};
pub use store::{ArgumentGraph, GraphDocument, GraphError, GraphResult};
pub use types::{NodeId, NodeType};

/// Display name for nodes without a speaker
pub const UNKNOWN_SPEAKER: &str = "Unknown";
