use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ChatMessage, ChatModel, ChatRequest, ClientError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for a local Ollama-compatible chat endpoint
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ApiChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: SamplingOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a serde_json::Value>,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ApiChatResponse {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ApiChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: SamplingOptions {
                temperature: request.temperature,
            },
            format: request.format.as_ref(),
        };

        debug!(
            model = %request.model,
            turns = request.messages.len(),
            temperature = request.temperature,
            "Sending chat request"
        );

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ApiChatResponse = response.json().await.map_err(ClientError::Malformed)?;
        if parsed.message.content.trim().is_empty() {
            return Err(ClientError::EmptyResponse);
        }

        Ok(parsed.message.content)
    }
}
