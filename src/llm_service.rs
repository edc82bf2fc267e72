use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::traits::InferenceBackend;

/// Text of one inference reply, independent of the payload shape it came in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceReply {
    pub text: String,
}

impl InferenceReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Extract reply text from a chat payload.
    ///
    /// Accepts a structured reply (`message.content`), a bare JSON string, and
    /// otherwise falls back to the serialized payload itself.
    pub fn from_payload(payload: &Value) -> Self {
        if let Some(content) = payload.pointer("/message/content").and_then(Value::as_str) {
            return Self::new(content);
        }

        match payload {
            Value::String(text) => Self::new(text.as_str()),
            other => Self::new(other.to_string()),
        }
    }

    /// Extract reply text from a raw response body; non-JSON bodies are taken as plain text
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(payload) => Self::from_payload(&payload),
            Err(_) => Self::new(body),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// Response from /api/tags
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: String,
}

/// HTTP client for an Ollama server
pub struct OllamaClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(request_timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.ollama_host, config.request_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn probe_health(&self) -> Result<()> {
        let response = self
            .http_client
            .get(self.url("/"))
            .send()
            .await
            .with_context(|| format!("Ollama server at {} is not reachable", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Ollama health probe returned {}", status);
        }
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .http_client
            .get(self.url("/api/tags"))
            .send()
            .await
            .context("Failed to query model list")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Model list query returned {}", status);
        }

        let tags: TagsResponse = response
            .json()
            .await
            .context("Failed to parse model list")?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn chat(&self, model: &str, prompt: &str) -> Result<InferenceReply> {
        let request_body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatOptions { temperature: 0.1 },
        };

        let response = self
            .http_client
            .post(self.url("/api/chat"))
            .json(&request_body)
            .send()
            .await
            .context("Chat request failed")?;

        let status = response.status();
        let body = response.text().await.context("Failed to read chat response")?;

        if !status.is_success() {
            anyhow::bail!("Ollama chat error ({}): {}", status, body);
        }

        Ok(InferenceReply::from_body(&body))
    }

    async fn pull_model(&self, name: &str) -> Result<()> {
        // Pulls can take far longer than a chat round-trip
        let response = self
            .http_client
            .post(self.url("/api/pull"))
            .timeout(Duration::from_secs(3600))
            .json(&PullRequest { name, stream: false })
            .send()
            .await
            .with_context(|| format!("Failed to pull model '{}'", name))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Pulling model '{}' returned {}: {}", name, status, body);
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}
