//! Crate-level error type
//!
//! Module errors convert into [`Error`] so callers of the pipeline see one
//! flat set of failure kinds.

use crate::analysis::AnalysisError;
use crate::config::ConfigError;
use crate::embed::EmbedError;
use crate::extract::ExtractError;
use crate::graph::{GraphError, NodeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Conversation text could not be turned into a graph
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The embedding provider failed; the structural graph is still usable
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// An analysis pass ran on a node without an embedding
    #[error("Node {node_id} has no embedding")]
    MissingEmbedding { node_id: NodeId },

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ExtractError> for Error {
    fn from(err: ExtractError) -> Self {
        Error::ExtractionFailed(err.to_string())
    }
}

impl From<EmbedError> for Error {
    fn from(err: EmbedError) -> Self {
        Error::EmbeddingFailed(err.to_string())
    }
}

impl From<AnalysisError> for Error {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::MissingEmbedding { node_id } => Error::MissingEmbedding { node_id },
            AnalysisError::Embedding(inner) => inner.into(),
            // a provider returning the wrong number or shape of vectors
            AnalysisError::CountMismatch { .. } => Error::EmbeddingFailed(err.to_string()),
            other => Error::Analysis(other.to_string()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_mapping() {
        let err: Error = AnalysisError::MissingEmbedding { node_id: NodeId::new("n2") }.into();
        assert!(matches!(err, Error::MissingEmbedding { ref node_id } if node_id.as_str() == "n2"));

        let err: Error = AnalysisError::Embedding(EmbedError::NetworkError("down".into())).into();
        assert!(matches!(err, Error::EmbeddingFailed(_)));

        let err: Error = AnalysisError::CountMismatch { expected: 3, got: 2 }.into();
        assert!(matches!(err, Error::EmbeddingFailed(_)));
    }

    #[test]
    fn test_extract_error_mapping() {
        let err: Error = ExtractError::EmptyInput.into();
        assert!(matches!(err, Error::ExtractionFailed(_)));
        assert!(err.to_string().starts_with("Extraction failed"));
    }
}
