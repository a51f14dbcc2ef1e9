use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assistant::tools::ToolName;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    RateLimitError,
    AuthenticationError,
    ServerError,
    #[serde(other)]
    Unknown,
}

/// Error record carried by an inbound `error` event.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerError {
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse or serialize JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidToolArguments {
        tool: ToolName,
        #[source]
        source: serde_json::Error,
    },

    #[error("The connection was closed unexpectedly")]
    ConnectionClosed,

    #[error("No async runtime available to schedule {0}")]
    NoRuntime(&'static str),

    #[error("Invalid form edit: {0}")]
    InvalidFormEdit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
