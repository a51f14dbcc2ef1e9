use serde::{Deserialize, Serialize};

use super::Item;

/// Per-response overrides sent with `response.create`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ResponseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    InProgress,
    Completed,
    Cancelled,
    Failed,
    Incomplete,
    #[serde(other)]
    Unknown,
}

/// The `response` payload of a `response.done` event.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Response {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<ResponseStatus>,
    #[serde(default)]
    pub output: Option<Vec<Item>>,
}

impl Response {
    /// Output items in the order the model produced them.
    #[must_use]
    pub fn outputs(&self) -> &[Item] {
        self.output.as_deref().unwrap_or_default()
    }
}
