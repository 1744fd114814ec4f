//! Chat client for the extraction LLM

use crate::config::{LLMProvider, LlmConfig};
use crate::extract::{ExtractError, ExtractResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    api_base_url: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> ExtractResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ExtractError::ConfigError(e.to_string()))?;

        if config.provider == LLMProvider::AzureOpenAI && config.api_base_url.is_none() {
            return Err(ExtractError::ConfigError("AzureOpenAI requires api_base_url".to_string()));
        }

        let api_base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| config.provider.default_base_url().to_string());

        Ok(Self {
            client,
            config: config.clone(),
            api_base_url,
        })
    }

    pub fn provider(&self) -> LLMProvider {
        self.config.provider
    }

    /// Send one system + user exchange and return the raw reply text.
    /// Providers are asked for a JSON object where the API supports it.
    pub async fn complete_json(&self, system_prompt: &str, user_text: &str) -> ExtractResult<String> {
        debug!("Requesting completion from {:?}/{}", self.config.provider, self.config.model);
        match self.config.provider {
            LLMProvider::OpenAI => self.openai_chat(system_prompt, user_text).await,
            LLMProvider::Ollama => self.ollama_chat(system_prompt, user_text).await,
            LLMProvider::Gemini => self.gemini_chat(system_prompt, user_text).await,
            LLMProvider::Mock => Ok(mock_reply(user_text)),
            _ => Err(ExtractError::ConfigError(format!("Provider {:?} not yet implemented", self.config.provider))),
        }
    }

    async fn openai_chat(&self, system_prompt: &str, user_text: &str) -> ExtractResult<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            kind: &'static str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
            response_format: ResponseFormat,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: Option<String>,
        }

        let api_key = self.config.api_key.as_ref().ok_or_else(|| ExtractError::ConfigError("OpenAI requires API key".to_string()))?;

        let url = format!("{}/chat/completions", self.api_base_url);
        let resp = self.client.post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: &self.config.model,
                messages: vec![
                    Message { role: "system", content: system_prompt },
                    Message { role: "user", content: user_text },
                ],
                temperature: self.config.temperature,
                response_format: ResponseFormat { kind: "json_object" },
            })
            .send()
            .await
            .map_err(|e| ExtractError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ExtractError::ApiError(format!("OpenAI error: {}", text)));
        }

        let result: Response = resp.json().await.map_err(|e| ExtractError::SerializationError(e.to_string()))?;
        Ok(result.choices.into_iter().next().and_then(|c| c.message.content).unwrap_or_default())
    }

    async fn ollama_chat(&self, system_prompt: &str, user_text: &str) -> ExtractResult<String> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: &'a str,
            system: &'a str,
            format: &'static str,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct Response {
            response: String,
        }

        let url = format!("{}/api/generate", self.api_base_url);
        let resp = self.client.post(&url)
            .json(&Request {
                model: &self.config.model,
                prompt: user_text,
                system: system_prompt,
                format: "json",
                stream: false,
            })
            .send()
            .await
            .map_err(|e| ExtractError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ExtractError::ApiError(format!("Ollama error: {}", resp.status())));
        }

        let result: Response = resp.json().await.map_err(|e| ExtractError::SerializationError(e.to_string()))?;
        Ok(result.response)
    }

    async fn gemini_chat(&self, system_prompt: &str, user_text: &str) -> ExtractResult<String> {
        #[derive(Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }

        #[derive(Deserialize)]
        struct Content {
            parts: Vec<Part>,
        }

        #[derive(Deserialize)]
        struct Part {
            text: String,
        }

        let api_key = self.config.api_key.as_ref().ok_or_else(|| ExtractError::ConfigError("Gemini requires API key".to_string()))?;

        let url = format!("{}/models/{}:generateContent?key={}", self.api_base_url, self.config.model, api_key);
        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": [{ "role": "user", "parts": [{ "text": user_text }] }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "responseMimeType": "application/json"
            }
        });

        let resp = self.client.post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ExtractError::ApiError(format!("Gemini error: {}", text)));
        }

        let result: Response = resp.json().await.map_err(|e| ExtractError::SerializationError(e.to_string()))?;

        let text = result
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        Ok(text)
    }
}

const DECISION_MARKERS: [&str; 5] = ["decide", "decided", "let's go with", "agreed", "we will go"];
const CONCERN_MARKERS: [&str; 5] = ["but ", "however", "concern", "worried", "risk"];

/// Offline stand-in for the model: one node per `Speaker: text` line,
/// typed and linked with simple surface cues.
fn mock_reply(user_text: &str) -> String {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut last_issue: Option<String> = None;
    let mut last_position: Option<String> = None;
    let mut position_since_issue = false;

    let lines = user_text.lines().map(str::trim).filter(|l| !l.is_empty());
    for (idx, line) in lines.enumerate() {
        let id = format!("n{}", idx + 1);
        let (speaker, body) = split_speaker(line);
        let lower = body.to_lowercase();

        let node_type = if body.ends_with('?') || body.ends_with('？') {
            "issue"
        } else if DECISION_MARKERS.iter().any(|m| lower.contains(m)) {
            "decision"
        } else if last_issue.is_some() && !position_since_issue {
            "position"
        } else {
            "argument"
        };

        let link = match node_type {
            "issue" => {
                last_issue = Some(id.clone());
                position_since_issue = false;
                None
            }
            "position" => {
                position_since_issue = true;
                last_position = Some(id.clone());
                last_issue.clone().map(|target| (target, "proposal"))
            }
            "decision" => last_position.clone().map(|target| (target, "decision")),
            _ => {
                let label = if CONCERN_MARKERS.iter().any(|m| lower.contains(m)) {
                    "concern"
                } else {
                    "support"
                };
                last_position.clone().map(|target| (target, label))
            }
        };
        if let Some((target, label)) = link {
            edges.push(json!({ "source": id, "target": target, "label": label }));
        }

        let summary: String = body.chars().take(40).collect();
        nodes.push(json!({
            "id": id,
            "type": node_type,
            "content": summary,
            "original_text": line,
            "speaker": speaker,
            "sequence": idx + 1,
        }));
    }

    json!({ "nodes": nodes, "edges": edges }).to_string()
}

fn split_speaker(line: &str) -> (Option<&str>, &str) {
    let split = line
        .char_indices()
        .find(|(_, c)| *c == ':' || *c == '：')
        .map(|(i, c)| (i, c.len_utf8()));

    match split {
        Some((i, width)) if i > 0 && line[..i].chars().count() <= 20 => {
            (Some(line[..i].trim()), line[i + width..].trim())
        }
        _ => (None, line),
    }
}
