use serde::{Deserialize, Serialize};

use super::models::{ResponseConfig, SessionUpdate};

/// Messages this crate sends to the realtime model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        session: Box<SessionUpdate>,
    },
    #[serde(rename = "response.create")]
    ResponseCreate {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<Box<ResponseConfig>>,
    },
}

impl ClientEvent {
    /// A `response.create` that asks the model to continue with `instructions`.
    #[must_use]
    pub fn continue_with(instructions: impl Into<String>) -> Self {
        Self::ResponseCreate {
            event_id: None,
            response: Some(Box::new(ResponseConfig {
                instructions: Some(instructions.into()),
            })),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::ResponseCreate { .. } => "response.create",
        }
    }
}
