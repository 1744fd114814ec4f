//! In-memory argument graph
//!
//! Nodes live in an insertion-ordered map keyed by id, so lookups are O(1)
//! and iteration follows extraction order. Edges are kept as a plain list.

use super::edge::Edge;
use super::node::{AnalysisState, Node};
use super::types::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Graph errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Serialized shape of a graph: the same `{"nodes": [...], "edges": [...]}`
/// object the extraction prompt asks the model to produce
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// An argument graph: ordered nodes plus labeled edges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument", into = "GraphDocument")]
pub struct ArgumentGraph {
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
}

impl ArgumentGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph, rejecting duplicate node ids
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<Self> {
        let mut graph = ArgumentGraph {
            nodes: IndexMap::with_capacity(nodes.len()),
            edges,
        };
        for node in nodes {
            graph.add_node(node)?;
        }
        Ok(graph)
    }

    /// Append a node
    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Append an edge. Endpoints are not validated.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges whose endpoints both exist, paired with the endpoint nodes
    pub fn resolved_edges(&self) -> impl Iterator<Item = (&Node, &Node, &Edge)> {
        self.edges.iter().filter_map(move |edge| {
            let source = self.nodes.get(edge.source.as_str())?;
            let target = self.nodes.get(edge.target.as_str())?;
            Some((source, target, edge))
        })
    }

    /// Number of edges referencing a missing node
    pub fn dangling_edge_count(&self) -> usize {
        self.edges.len() - self.resolved_edges().count()
    }

    /// Node indices in conversation order.
    ///
    /// Nodes with a `sequence` come first, ascending, ties broken by
    /// insertion order; nodes without one follow in insertion order.
    pub fn sequence_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&idx| {
            let sequence = self.nodes[idx].sequence;
            (sequence.is_none(), sequence.unwrap_or_default(), idx)
        });
        order
    }

    /// Node at an insertion index
    pub fn node_at(&self, idx: usize) -> Option<&Node> {
        self.nodes.get_index(idx).map(|(_, node)| node)
    }

    /// Replace the analysis state of every node, in insertion order.
    ///
    /// The caller must supply one state per node; this is how passes commit
    /// their results in one step.
    pub(crate) fn commit_analysis(&mut self, states: Vec<AnalysisState>) {
        debug_assert_eq!(states.len(), self.nodes.len());
        for (node, state) in self.nodes.values_mut().zip(states) {
            node.analysis = state;
        }
    }

    /// Distinct speakers in conversation order ("Unknown" for missing)
    pub fn speakers(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for idx in self.sequence_order() {
            let speaker = self.nodes[idx]
                .speaker
                .clone()
                .unwrap_or_else(|| super::UNKNOWN_SPEAKER.to_string());
            if !seen.contains(&speaker) {
                seen.push(speaker);
            }
        }
        seen
    }
}

impl TryFrom<GraphDocument> for ArgumentGraph {
    type Error = GraphError;

    fn try_from(doc: GraphDocument) -> GraphResult<Self> {
        ArgumentGraph::from_parts(doc.nodes, doc.edges)
    }
}

impl From<ArgumentGraph> for GraphDocument {
    fn from(graph: ArgumentGraph) -> Self {
        GraphDocument {
            nodes: graph.nodes.into_values().collect(),
            edges: graph.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArgumentGraph {
        ArgumentGraph::from_parts(
            vec![
                Node::new("n1", "issue", "What to build?").with_sequence(2),
                Node::new("n2", "position", "A parser").with_sequence(1),
                Node::new("n3", "argument", "We need it anyway"),
            ],
            vec![
                Edge::new("n2", "n1", "proposal"),
                Edge::new("n3", "n2", "support"),
                Edge::new("n4", "n2", "support"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(Node::new("n1", "issue", "a")).unwrap();
        let err = graph.add_node(Node::new("n1", "issue", "b")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode(NodeId::new("n1")));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let graph = sample();
        let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2", "n3"]);
    }

    #[test]
    fn test_resolved_edges_drop_dangling() {
        let graph = sample();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.resolved_edges().count(), 2);
        assert_eq!(graph.dangling_edge_count(), 1);
    }

    #[test]
    fn test_sequence_order() {
        let graph = sample();
        // n2 (seq 1), n1 (seq 2), then n3 without sequence
        assert_eq!(graph.sequence_order(), vec![1, 0, 2]);
    }

    #[test]
    fn test_json_round_trip_shape() {
        let json = r#"{"nodes":[{"id":"n1","type":"issue","content":"x"}],"edges":[{"source":"n1","target":"n9","label":"l"}]}"#;
        let graph: ArgumentGraph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"][0]["id"], "n1");
        assert_eq!(value["edges"][0]["target"], "n9");
    }

    #[test]
    fn test_json_duplicate_ids_fail() {
        let json = r#"{"nodes":[{"id":"n1","type":"issue","content":"x"},{"id":"n1","type":"issue","content":"y"}],"edges":[]}"#;
        assert!(serde_json::from_str::<ArgumentGraph>(json).is_err());
    }

    #[test]
    fn test_speakers_in_conversation_order() {
        let graph = ArgumentGraph::from_parts(
            vec![
                Node::new("n1", "issue", "a").with_speaker("B").with_sequence(2),
                Node::new("n2", "issue", "b").with_speaker("A").with_sequence(1),
                Node::new("n3", "issue", "c").with_sequence(3),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(graph.speakers(), vec!["A", "B", "Unknown"]);
    }
}
