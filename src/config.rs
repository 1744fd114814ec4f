//! Application configuration
//!
//! Settings are read from an optional YAML file and then overridden from the
//! environment (a `.env` file is honoured by the binaries). Every section has
//! defaults, so an empty file is a valid configuration.

use crate::analysis::AnalysisMode;
use crate::render::FlowDirection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Ollama,
    Gemini,
    AzureOpenAI,
    Anthropic,
    /// Deterministic offline provider for tests and demos
    Mock,
}

impl FromStr for LLMProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "ollama" => Ok(LLMProvider::Ollama),
            "gemini" => Ok(LLMProvider::Gemini),
            "azureopenai" | "azure" => Ok(LLMProvider::AzureOpenAI),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "mock" => Ok(LLMProvider::Mock),
            other => Err(ConfigError::InvalidValue {
                key: "provider".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl LLMProvider {
    /// Default API base URL for the provider (empty when it must be configured)
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1",
            LLMProvider::Ollama => "http://localhost:11434",
            LLMProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            LLMProvider::AzureOpenAI => "",
            LLMProvider::Anthropic => "https://api.anthropic.com/v1",
            LLMProvider::Mock => "",
        }
    }

    /// Environment variable conventionally holding this provider's key
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Gemini => Some("GEMINI_API_KEY"),
            LLMProvider::AzureOpenAI => Some("AZURE_OPENAI_API_KEY"),
            LLMProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LLMProvider::Ollama | LLMProvider::Mock => None,
        }
    }
}

/// Configuration for the extraction LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// The LLM provider to use
    pub provider: LLMProvider,
    /// Model name (e.g., "gpt-4o", "llama3")
    pub model: String,
    /// API Key (optional, loaded from the provider's env var if None)
    pub api_key: Option<String>,
    /// API Base URL (required for Azure, optional for others)
    pub api_base_url: Option<String>,
    /// Replaces the built-in extraction prompt
    pub system_prompt: Option<String>,
    pub temperature: f32,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            model: "gpt-4o".to_string(),
            api_key: None,
            api_base_url: None,
            system_prompt: None,
            temperature: 0.0,
            request_timeout_secs: 120,
        }
    }
}

/// Configuration for the embedding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// The provider to use
    pub provider: LLMProvider,
    /// Model name (e.g., "text-embedding-3-small")
    pub model: String,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Vector length produced by the mock provider
    pub mock_dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            api_base_url: None,
            request_timeout_secs: 30,
            mock_dimension: 64,
        }
    }
}

/// Configuration for the numeric analysis step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run embedding + analysis after extraction
    pub topic_analysis: bool,
    /// Which pass to run
    pub mode: AnalysisMode,
    /// Cluster count for [`AnalysisMode::Clusters`]
    pub num_clusters: usize,
    pub flow_direction: FlowDirection,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            topic_analysis: true,
            mode: AnalysisMode::TopicMap,
            num_clusters: 5,
            flow_direction: FlowDirection::TopDown,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from an optional YAML file, then apply process environment overrides
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_yaml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a map in tests)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("TOPICFLOW_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = lookup("TOPICFLOW_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = lookup("TOPICFLOW_EMBEDDING_PROVIDER") {
            self.embedding.provider = value.parse()?;
        }
        if let Some(value) = lookup("TOPICFLOW_EMBEDDING_MODEL") {
            self.embedding.model = value;
        }
        if let Some(value) = lookup("TOPICFLOW_PORT") {
            self.server.port = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TOPICFLOW_PORT".to_string(),
                value,
            })?;
        }

        if self.llm.api_key.is_none() {
            self.llm.api_key = self.llm.provider.api_key_env().and_then(&lookup);
        }
        if self.embedding.api_key.is_none() {
            self.embedding.api_key = self.embedding.provider.api_key_env().and_then(&lookup);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml_str("").unwrap();
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.analysis.num_clusters, 5);
        assert!(config.analysis.topic_analysis);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "llm:\n  provider: ollama\n  model: llama3\nanalysis:\n  mode: clusters\n  num_clusters: 3\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.llm.provider, LLMProvider::Ollama);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.analysis.mode, AnalysisMode::Clusters);
        assert_eq!(config.analysis.num_clusters, 3);
        // untouched sections keep defaults
        assert_eq!(config.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TOPICFLOW_LLM_PROVIDER", "mock"),
            ("TOPICFLOW_PORT", "9090"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.provider, LLMProvider::Mock);
        assert_eq!(config.llm.api_key, None);
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == "TOPICFLOW_EMBEDDING_PROVIDER").then(|| "nope".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 7000").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.address, "127.0.0.1");
        // TOPICFLOW_PORT is not set in the test environment
        if std::env::var("TOPICFLOW_PORT").is_err() {
            assert_eq!(config.server.port, 7000);
        }
    }
}
