pub mod error;
pub mod llm;
pub mod prompt;
pub mod schema;
pub mod tokens;

pub use error::ExtractError;
pub use llm::{OllamaChatClient, options_for};
pub use prompt::{build_messages, build_messages_for_tag};
pub use schema::{
    ChatRequest, ExtractionMode, FailureKind, Measurement, Message, RequestFailure,
    RequestOptions, ResponseOutput, Role, ServerTimings,
};
pub use tokens::estimate_tokens;
