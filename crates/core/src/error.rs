//! Error taxonomy for fetching and resolving a discussion stream
//!
//! Every variant names the stage that failed so the shell can surface a
//! diagnostic without inspecting the message.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The request could not be completed or returned a non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// The JSON is well-formed but a required key or shape is missing.
    #[error("schema error: {0}")]
    Schema(String),

    /// A relationship points at a resource absent from the index.
    #[error("no resource matches type {kind} and id {id}")]
    NotFound { kind: String, id: String },

    /// An accessor was used before a successful fetch.
    #[error("state error: {0}")]
    State(String),
}

impl StreamError {
    pub fn schema(message: impl Into<String>) -> Self {
        StreamError::Schema(message.into())
    }

    /// Short stage label used by the shell diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            StreamError::Transport(_) => "transport",
            StreamError::Parse(_) => "parse",
            StreamError::Schema(_) => "schema",
            StreamError::NotFound { .. } => "missing relationship",
            StreamError::State(_) => "state",
        }
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Parse(err.to_string())
    }
}
