//! Node implementation for the argument graph
//!
//! A node is one utterance or claim. Besides its extracted fields it carries
//! an [`AnalysisState`] describing which numeric pass, if any, has run on it.

use super::types::{NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A node in the argument graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Argument role
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Short human-readable summary
    pub content: String,

    /// Verbatim excerpt from the conversation, preferred for embedding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    /// Position in the conversation (1-based in extraction output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,

    /// Numeric state written by the analysis passes
    #[serde(default, skip_serializing_if = "AnalysisState::is_unanalyzed")]
    pub analysis: AnalysisState,
}

impl Node {
    /// Create a new node with no optional fields
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<NodeType>, content: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            node_type: node_type.into(),
            content: content.into(),
            original_text: None,
            speaker: None,
            sequence: None,
            analysis: AnalysisState::Unanalyzed,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_original_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = Some(text.into());
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisState) -> Self {
        self.analysis = analysis;
        self
    }

    /// Text handed to the embedding provider: the verbatim excerpt when
    /// present and non-blank, otherwise the summary
    pub fn embedding_text(&self) -> &str {
        match &self.original_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => &self.content,
        }
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.analysis.embedding()
    }

    pub fn position(&self) -> Option<[f64; 2]> {
        self.analysis.position()
    }

    pub fn cluster_id(&self) -> Option<usize> {
        self.analysis.cluster_id()
    }

    pub fn metrics(&self) -> Option<&TopicMetrics> {
        self.analysis.metrics()
    }
}

/// Per-node similarity/distance scores against the anchor (first node in
/// sequence order) and against the immediate predecessor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicMetrics {
    pub similarity_to_first: f64,
    pub distance_to_first: f64,
    pub similarity_to_previous: f64,
    pub distance_to_previous: f64,
}

impl TopicMetrics {
    /// Scores of a node compared with itself
    pub const IDENTITY: TopicMetrics = TopicMetrics {
        similarity_to_first: 1.0,
        distance_to_first: 0.0,
        similarity_to_previous: 1.0,
        distance_to_previous: 0.0,
    };
}

/// Which analysis pass has populated a node, and with what
///
/// Each variant carries exactly the values its producing pass computes, so
/// reading a cluster id from a projected node is impossible by construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisState {
    #[default]
    Unanalyzed,
    Embedded {
        embedding: Vec<f32>,
    },
    Projected {
        embedding: Vec<f32>,
        position: [f64; 2],
    },
    Clustered {
        embedding: Vec<f32>,
        cluster_id: usize,
    },
    Scored {
        embedding: Vec<f32>,
        metrics: TopicMetrics,
    },
}

impl AnalysisState {
    pub fn is_unanalyzed(&self) -> bool {
        matches!(self, AnalysisState::Unanalyzed)
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        match self {
            AnalysisState::Unanalyzed => None,
            AnalysisState::Embedded { embedding }
            | AnalysisState::Projected { embedding, .. }
            | AnalysisState::Clustered { embedding, .. }
            | AnalysisState::Scored { embedding, .. } => Some(embedding),
        }
    }

    pub fn position(&self) -> Option<[f64; 2]> {
        match self {
            AnalysisState::Projected { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn cluster_id(&self) -> Option<usize> {
        match self {
            AnalysisState::Clustered { cluster_id, .. } => Some(*cluster_id),
            _ => None,
        }
    }

    pub fn metrics(&self) -> Option<&TopicMetrics> {
        match self {
            AnalysisState::Scored { metrics, .. } => Some(metrics),
            _ => None,
        }
    }

    /// Short name of the state, for logs and tables
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisState::Unanalyzed => "unanalyzed",
            AnalysisState::Embedded { .. } => "embedded",
            AnalysisState::Projected { .. } => "projected",
            AnalysisState::Clustered { .. } => "clustered",
            AnalysisState::Scored { .. } => "scored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node() {
        let node = Node::new("n1", "issue", "API spec unclear")
            .with_speaker("A")
            .with_sequence(1);

        assert_eq!(node.id, NodeId::new("n1"));
        assert_eq!(node.node_type, NodeType::Issue);
        assert_eq!(node.speaker.as_deref(), Some("A"));
        assert_eq!(node.sequence, Some(1));
        assert!(node.analysis.is_unanalyzed());
    }

    #[test]
    fn test_embedding_text_fallback() {
        let node = Node::new("n1", "issue", "summary");
        assert_eq!(node.embedding_text(), "summary");

        let node = node.with_original_text("A: the full quote");
        assert_eq!(node.embedding_text(), "A: the full quote");

        let blank = Node::new("n2", "issue", "summary").with_original_text("   ");
        assert_eq!(blank.embedding_text(), "summary");
    }

    #[test]
    fn test_state_accessors() {
        let projected = AnalysisState::Projected {
            embedding: vec![1.0, 0.0],
            position: [0.5, -0.5],
        };
        assert_eq!(projected.embedding(), Some(&[1.0f32, 0.0][..]));
        assert_eq!(projected.position(), Some([0.5, -0.5]));
        assert_eq!(projected.cluster_id(), None);
        assert!(projected.metrics().is_none());

        let clustered = AnalysisState::Clustered {
            embedding: vec![1.0],
            cluster_id: 3,
        };
        assert_eq!(clustered.cluster_id(), Some(3));
        assert_eq!(clustered.position(), None);
    }

    #[test]
    fn test_deserialize_extraction_shape() {
        let json = r#"{
            "id": "n1",
            "type": "issue",
            "content": "API spec unclear",
            "original_text": "A: the API docs are missing parts.",
            "speaker": "A",
            "sequence": 1
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.node_type, NodeType::Issue);
        assert_eq!(node.sequence, Some(1));
        assert!(node.analysis.is_unanalyzed());
    }

    #[test]
    fn test_unanalyzed_is_not_serialized() {
        let node = Node::new("n1", "position", "x");
        let value = serde_json::to_value(&node).unwrap();
        assert!(value.get("analysis").is_none());

        let scored = node.with_analysis(AnalysisState::Scored {
            embedding: vec![0.0],
            metrics: TopicMetrics::IDENTITY,
        });
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["analysis"]["state"], "scored");
    }
}
