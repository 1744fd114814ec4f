//! Edge implementation for the argument graph

use super::types::NodeId;
use serde::{Deserialize, Serialize};

/// A directed, labeled relation between two nodes
///
/// Endpoints are not checked against the node set: extraction output may
/// reference ids it never emitted, and renderers drop such edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Free-text relation, e.g. "support"
    #[serde(default)]
    pub label: String,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }

    /// Whether the edge carries a non-blank label
    pub fn has_label(&self) -> bool {
        !self.label.trim().is_empty()
    }
}
