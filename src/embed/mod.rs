//! Embedding providers
//!
//! Turns node texts into fixed-length vectors. The engine only depends on
//! the [`EmbeddingProvider`] trait; [`client::EmbeddingClient`] is the
//! HTTP-backed implementation.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

pub use client::EmbeddingClient;

/// Embed errors
#[derive(Error, Debug)]
pub enum EmbedError {
    /// API error from the provider
    #[error("Embedding API error: {0}")]
    ApiError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Provider answered with the wrong number of vectors
    #[error("Provider returned {got} embeddings for {expected} inputs")]
    LengthMismatch { expected: usize, got: usize },
}

pub type EmbedResult<T> = Result<T, EmbedError>;

/// Anything that can embed a batch of strings.
///
/// Implementations must return exactly one vector per input, in input
/// order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>>;
}

/// Call `provider` and enforce the one-vector-per-input contract
pub async fn embed_checked(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> EmbedResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let vectors = provider.embed(texts).await?;
    if vectors.len() != texts.len() {
        return Err(EmbedError::LengthMismatch {
            expected: texts.len(),
            got: vectors.len(),
        });
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ShortProvider;

    #[async_trait]
    impl EmbeddingProvider for ShortProvider {
        fn name(&self) -> &str {
            "short"
        }

        async fn embed(&self, _texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    #[tokio::test]
    async fn test_length_mismatch_detected() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let err = embed_checked(&ShortProvider, &texts).await.unwrap_err();
        assert!(matches!(err, EmbedError::LengthMismatch { expected: 2, got: 1 }));
    }

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        let vectors = embed_checked(&ShortProvider, &[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
