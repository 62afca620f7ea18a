//! Error types for the debate system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown {kind}: '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("Malformed {kind} '{id}': missing required field `{field}`")]
    Malformed {
        kind: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
