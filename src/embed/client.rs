//! Embedding client for various LLM providers

use crate::config::{EmbeddingConfig, LLMProvider};
use crate::embed::{EmbedError, EmbedResult, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for interacting with LLM APIs to generate embeddings
pub struct EmbeddingClient {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: Option<String>,
    api_base_url: String,
    mock_dimension: usize,
}

impl EmbeddingClient {
    /// Create a new embedding client based on configuration
    pub fn new(config: &EmbeddingConfig) -> EmbedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EmbedError::ConfigError(e.to_string()))?;

        if config.provider == LLMProvider::AzureOpenAI && config.api_base_url.is_none() {
            return Err(EmbedError::ConfigError("AzureOpenAI requires api_base_url".to_string()));
        }
        if config.provider == LLMProvider::Mock && config.mock_dimension == 0 {
            return Err(EmbedError::ConfigError("mock_dimension must be positive".to_string()));
        }

        let api_base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| config.provider.default_base_url().to_string());

        Ok(Self {
            client,
            provider: config.provider,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            api_base_url,
            mock_dimension: config.mock_dimension,
        })
    }

    /// Generate embeddings for a batch of texts
    pub async fn generate_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        debug!("Embedding {} texts with {:?}/{}", texts.len(), self.provider, self.model);
        match self.provider {
            LLMProvider::OpenAI => self.openai_embeddings(texts).await,
            LLMProvider::Ollama => self.ollama_embeddings(texts).await,
            LLMProvider::Gemini => self.gemini_embeddings(texts).await,
            LLMProvider::Mock => Ok(texts.iter().map(|t| mock_embedding(t, self.mock_dimension)).collect()),
            _ => Err(EmbedError::ConfigError(format!("Provider {:?} not yet implemented", self.provider))),
        }
    }

    async fn openai_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: &'a [String],
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<OpenAIData>,
        }

        #[derive(Deserialize)]
        struct OpenAIData {
            index: usize,
            embedding: Vec<f32>,
        }

        let api_key = self.api_key.as_ref().ok_or_else(|| EmbedError::ConfigError("OpenAI requires API key".to_string()))?;

        let url = format!("{}/embeddings", self.api_base_url);
        let resp = self.client.post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&OpenAIRequest {
                input: texts,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError(format!("OpenAI returned error: {}", error_text)));
        }

        let mut result: OpenAIResponse = resp.json().await.map_err(|e| EmbedError::SerializationError(e.to_string()))?;
        // The API documents `index`; do not rely on response order
        result.data.sort_by_key(|d| d.index);
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn ollama_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            let url = format!("{}/api/embeddings", self.api_base_url);
            let resp = self.client.post(&url)
                .json(&OllamaRequest {
                    model: &self.model,
                    prompt: text,
                })
                .send()
                .await
                .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

            if !resp.status().is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                return Err(EmbedError::ApiError(format!("Ollama returned error: {}", error_text)));
            }

            let result: OllamaResponse = resp.json().await.map_err(|e| EmbedError::SerializationError(e.to_string()))?;
            results.push(result.embedding);
        }

        Ok(results)
    }

    async fn gemini_embeddings(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct GeminiBatchRequest<'a> {
            requests: Vec<GeminiRequest<'a>>,
        }

        #[derive(Serialize)]
        struct GeminiRequest<'a> {
            model: String,
            content: GeminiContent<'a>,
        }

        #[derive(Serialize)]
        struct GeminiContent<'a> {
            parts: Vec<GeminiPart<'a>>,
        }

        #[derive(Serialize)]
        struct GeminiPart<'a> {
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct GeminiBatchResponse {
            embeddings: Vec<GeminiEmbedding>,
        }

        #[derive(Deserialize)]
        struct GeminiEmbedding {
            values: Vec<f32>,
        }

        let api_key = self.api_key.as_ref().ok_or_else(|| EmbedError::ConfigError("Gemini requires API key".to_string()))?;

        let url = format!("{}/models/{}:batchEmbedContents?key={}", self.api_base_url, self.model, api_key);

        let requests = texts.iter().map(|t| GeminiRequest {
            model: format!("models/{}", self.model),
            content: GeminiContent {
                parts: vec![GeminiPart { text: t }],
            },
        }).collect();

        let resp = self.client.post(&url)
            .json(&GeminiBatchRequest { requests })
            .send()
            .await
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError(format!("Gemini returned error: {}", error_text)));
        }

        let result: GeminiBatchResponse = resp.json().await.map_err(|e| EmbedError::SerializationError(e.to_string()))?;
        Ok(result.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        self.generate_embeddings(texts).await
    }
}

/// Offline embedding: hashed character bigrams folded into `dims` buckets,
/// L2-normalised. Texts sharing vocabulary land close together, which is
/// enough to exercise the analysis passes without a network.
pub fn mock_embedding(text: &str, dims: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dims.max(1)];
    let chars: Vec<char> = text.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();

    for window in chars.windows(2) {
        let bucket = (fnv1a(window) % vector.len() as u64) as usize;
        vector[bucket] += 1.0;
    }
    if chars.len() == 1 {
        let bucket = (fnv1a(&chars) % vector.len() as u64) as usize;
        vector[bucket] += 1.0;
    }

    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
    vector
}

/// 64-bit FNV-1a over the UTF-8 bytes of `chars`
fn fnv1a(chars: &[char]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut buf = [0u8; 4];
    chars.iter().fold(OFFSET_BASIS, |hash, c| {
        c.encode_utf8(&mut buf)
            .bytes()
            .fold(hash, |h, byte| (h ^ byte as u64).wrapping_mul(PRIME))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: LLMProvider::Mock,
            mock_dimension: 16,
            ..EmbeddingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_mock_provider_shape() {
        let client = EmbeddingClient::new(&mock_config()).unwrap();
        let texts = vec!["hello world".to_string(), "".to_string()];
        let vectors = client.embed(&texts).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 16));
        // empty text embeds to the zero vector
        assert!(vectors[1].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_mock_embedding_deterministic_and_normalised() {
        let a = mock_embedding("The API spec is unclear", 32);
        let b = mock_embedding("The API spec is unclear", 32);
        assert_eq!(a, b);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mock_embedding_buckets_are_fixed() {
        assert_eq!(fnv1a(&[]), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(&['a', 'b']), 0x089c_4407_b545_986a);

        // "ab" has a single bigram, hashed into bucket 0x...6a % 8 == 2
        let v = mock_embedding("ab", 8);
        assert_eq!(v[2], 1.0);
        assert_eq!(v.iter().filter(|&&x| x != 0.0).count(), 1);

        let v = mock_embedding("議論", 16);
        assert_eq!(v[3], 1.0);
    }

    #[test]
    fn test_azure_requires_base_url() {
        let config = EmbeddingConfig {
            provider: LLMProvider::AzureOpenAI,
            ..EmbeddingConfig::default()
        };
        assert!(matches!(EmbeddingClient::new(&config), Err(EmbedError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_openai_requires_key() {
        let config = EmbeddingConfig {
            api_key: None,
            ..EmbeddingConfig::default()
        };
        let client = EmbeddingClient::new(&config).unwrap();
        let err = client.embed(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, EmbedError::ConfigError(_)));
    }
}
