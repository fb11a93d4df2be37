use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{ChatMessage, ChatModel, ChatRequest, ClientError};

/// One rendered workflow step, ready to send
#[derive(Debug, Clone)]
pub struct StepRequest<'a> {
    pub model: &'a str,
    /// Rendered instruction text for the system turn
    pub system: String,
    /// Optional user turn (some steps are instruction-only)
    pub user: Option<String>,
    pub temperature: f32,
}

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The model's text was not parseable into the step's contract.
    /// The raw text is preserved for diagnostics.
    #[error("response did not match the expected shape: {source}")]
    Decode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render output schema: {0}")]
    Schema(#[source] serde_json::Error),
}

/// Send one rendered step to the model, constraining its output to the JSON
/// schema of `T`, and strictly decode the textual response into `T`.
///
/// No retries: transport and decode failures both propagate to the caller.
pub async fn invoke_structured<T>(
    model: &dyn ChatModel,
    step: StepRequest<'_>,
) -> Result<T, InvokeError>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = serde_json::to_value(schemars::schema_for!(T)).map_err(InvokeError::Schema)?;

    let mut messages = vec![ChatMessage::system(step.system)];
    if let Some(user) = step.user {
        messages.push(ChatMessage::user(user));
    }

    let request = ChatRequest {
        model: step.model.to_string(),
        messages,
        temperature: step.temperature,
        format: Some(schema),
    };

    let raw = model.chat(&request).await?;
    debug!(len = raw.len(), "Decoding structured response");

    serde_json::from_str(&raw).map_err(|source| InvokeError::Decode { raw, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Greeting {
        message: String,
    }

    struct CannedModel(&'static str);

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn chat(&self, _request: &ChatRequest) -> Result<String, ClientError> {
            Ok(self.0.to_string())
        }
    }

    fn step() -> StepRequest<'static> {
        StepRequest {
            model: "llama3.1",
            system: "Say hello as JSON".to_string(),
            user: Some("hi".to_string()),
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn decodes_conforming_response() {
        let model = CannedModel(r#"{"message": "hello"}"#);
        let greeting: Greeting = invoke_structured(&model, step()).await.unwrap();
        assert_eq!(greeting.message, "hello");
    }

    #[tokio::test]
    async fn decode_failure_preserves_raw_text() {
        let model = CannedModel("I refuse to answer in JSON");
        let err = invoke_structured::<Greeting>(&model, step())
            .await
            .unwrap_err();
        match err {
            InvokeError::Decode { raw, .. } => {
                assert_eq!(raw, "I refuse to answer in JSON");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
