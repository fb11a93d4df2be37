mod invoke;
mod message;
mod ollama;
mod traits;

pub use invoke::{invoke_structured, InvokeError, StepRequest};
pub use message::{ChatMessage, Role};
pub use ollama::{OllamaClient, DEFAULT_BASE_URL};
pub use traits::{ChatModel, ChatRequest, ClientError};
