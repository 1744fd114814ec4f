//! Argument extraction
//!
//! Turns raw conversation text into an [`ArgumentGraph`] by prompting an
//! LLM for IBIS-structured JSON.

pub mod client;
pub mod prompt;

use crate::config::LlmConfig;
use crate::graph::{ArgumentGraph, GraphDocument};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

pub use client::LlmClient;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("LLM API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Input text is empty")]
    EmptyInput,
    #[error("Model returned an empty response")]
    EmptyResponse,
    #[error("Model output is not a valid argument graph: {0}")]
    InvalidGraph(String),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// A way of turning conversation text into an argument graph
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Short strategy name for logs
    fn name(&self) -> &str;

    async fn analyze(&self, text: &str) -> ExtractResult<ArgumentGraph>;
}

/// IBIS extraction (issue / position / argument / decision)
pub struct IbisStrategy {
    client: LlmClient,
    system_prompt: String,
}

impl IbisStrategy {
    pub fn new(config: &LlmConfig) -> ExtractResult<Self> {
        let client = LlmClient::new(config)?;
        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| prompt::IBIS_SYSTEM_PROMPT.to_string());
        Ok(Self { client, system_prompt })
    }
}

#[async_trait]
impl ExtractionStrategy for IbisStrategy {
    fn name(&self) -> &str {
        "ibis"
    }

    async fn analyze(&self, text: &str) -> ExtractResult<ArgumentGraph> {
        if text.trim().is_empty() {
            return Err(ExtractError::EmptyInput);
        }

        let reply = self.client.complete_json(&self.system_prompt, text).await?;
        let graph = parse_graph_reply(&reply)?;

        let dangling = graph.dangling_edge_count();
        if dangling > 0 {
            warn!("Extraction produced {} edges referencing unknown nodes", dangling);
        }
        info!(
            "Extracted {} nodes and {} edges ({:?})",
            graph.node_count(),
            graph.edge_count(),
            self.client.provider()
        );
        Ok(graph)
    }
}

/// Parse a model reply into a graph.
///
/// The reply may wrap the JSON object in a fenced code block or surround it
/// with prose; the outermost `{...}` is used.
pub fn parse_graph_reply(reply: &str) -> ExtractResult<ArgumentGraph> {
    let json = extract_json_object(reply).ok_or(ExtractError::EmptyResponse)?;

    let doc: GraphDocument = serde_json::from_str(json)
        .map_err(|e| ExtractError::InvalidGraph(e.to_string()))?;
    if doc.nodes.is_empty() {
        return Err(ExtractError::InvalidGraph("no nodes".to_string()));
    }

    ArgumentGraph::try_from(doc).map_err(|e| ExtractError::InvalidGraph(e.to_string()))
}

/// Locate the JSON object in an LLM response that may contain markdown
/// fences or explanations.
fn extract_json_object(response: &str) -> Option<&str> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Prefer the first fenced code block
    let body = match trimmed.find("```") {
        Some(start) => {
            let after_fence = &trimmed[start + 3..];
            // Skip language tag (e.g. "json\n")
            let code_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
            match after_fence[code_start..].find("```") {
                Some(end) => after_fence[code_start..code_start + end].trim(),
                None => trimmed,
            }
        }
        None => trimmed,
    };

    let open = body.find('{')?;
    let close = body.rfind('}')?;
    (close > open).then(|| &body[open..=close])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LLMProvider;
    use crate::graph::NodeType;

    #[test]
    fn test_extract_json_from_fence() {
        let reply = "Here you go:\n```json\n{\"nodes\": []}\n```\nDone.";
        assert_eq!(extract_json_object(reply), Some("{\"nodes\": []}"));
    }

    #[test]
    fn test_extract_json_bare() {
        assert_eq!(extract_json_object("  {\"a\":1} "), Some("{\"a\":1}"));
        assert_eq!(extract_json_object(""), None);
        assert_eq!(extract_json_object("no json"), None);
    }

    #[test]
    fn test_parse_valid_reply() {
        let reply = r#"{"nodes":[{"id":"n1","type":"issue","content":"x","sequence":1}],"edges":[{"source":"n1","target":"n7","label":"proposal"}]}"#;
        let graph = parse_graph_reply(reply).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node("n1").unwrap().node_type, NodeType::Issue);
        // dangling edges survive extraction; renderers drop them
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_graph_reply(""), Err(ExtractError::EmptyResponse)));
        assert!(matches!(parse_graph_reply("{\"nodes\": 3}"), Err(ExtractError::InvalidGraph(_))));
        assert!(matches!(parse_graph_reply("{\"nodes\": [], \"edges\": []}"), Err(ExtractError::InvalidGraph(_))));
    }

    #[test]
    fn test_parse_rejects_duplicate_ids() {
        let reply = r#"{"nodes":[{"id":"n1","type":"issue","content":"x"},{"id":"n1","type":"position","content":"y"}]}"#;
        assert!(matches!(parse_graph_reply(reply), Err(ExtractError::InvalidGraph(_))));
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let config = LlmConfig {
            provider: LLMProvider::Mock,
            ..LlmConfig::default()
        };
        let strategy = IbisStrategy::new(&config).unwrap();
        assert!(matches!(strategy.analyze("   \n").await, Err(ExtractError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_mock_strategy_end_to_end() {
        let config = LlmConfig {
            provider: LLMProvider::Mock,
            ..LlmConfig::default()
        };
        let strategy = IbisStrategy::new(&config).unwrap();
        let graph = strategy
            .analyze("A: Should we ship on Friday?\nB: Ship Monday instead.")
            .await
            .unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.resolved_edges().count(), 1);
    }
}
