use async_trait::async_trait;
use thiserror::Error;

use crate::ChatMessage;

/// Errors that can occur talking to the model endpoint
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("model endpoint unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed endpoint response: {0}")]
    Malformed(#[source] reqwest::Error),

    #[error("model returned an empty message")]
    EmptyResponse,
}

/// A single chat-completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0 for deterministic steps)
    pub temperature: f32,
    /// JSON schema the model output must conform to
    pub format: Option<serde_json::Value>,
}

/// The core abstraction over a chat-completion endpoint.
///
/// Returns the raw text content of the model's message; callers that expect
/// schema-constrained output decode it through [`crate::invoke_structured`].
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ClientError>;
}
