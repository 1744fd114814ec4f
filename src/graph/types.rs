//! Core type definitions for the argument graph

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a node (e.g. `"n1"`), as assigned by extraction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Argument role of a node (IBIS vocabulary)
///
/// Unknown roles coming back from extraction are kept verbatim in
/// [`NodeType::Other`] so renderers can fall back to a default shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// A question or problem under discussion
    Issue,
    /// A proposal answering an issue
    Position,
    /// A reason for or against a position
    Argument,
    /// An adopted outcome
    Decision,
    Other(String),
}

impl NodeType {
    /// The four canonical roles, in legend order
    pub const CANONICAL: [NodeType; 4] = [
        NodeType::Issue,
        NodeType::Position,
        NodeType::Argument,
        NodeType::Decision,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Issue => "issue",
            NodeType::Position => "position",
            NodeType::Argument => "argument",
            NodeType::Decision => "decision",
            NodeType::Other(s) => s.as_str(),
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, NodeType::Other(_))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "issue" => NodeType::Issue,
            "position" => NodeType::Position,
            "argument" => NodeType::Argument,
            "decision" => NodeType::Decision,
            _ => NodeType::Other(s),
        }
    }
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        NodeType::from(s.to_string())
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.as_str().to_string()
    }
}
