use serde::{Deserialize, Deserializer};

use super::{ArbitraryJson, Role};

/// An output item of a completed response.
///
/// Manual deserialization preserves unknown item kinds as raw JSON while
/// keeping strong typing for the ones the dispatcher acts on.
#[derive(Debug, Clone)]
pub enum Item {
    Message {
        id: Option<String>,
        role: Option<Role>,
        content: Vec<ContentPart>,
    },
    FunctionCall {
        id: Option<String>,
        call_id: Option<String>,
        name: String,
        /// Serialized JSON, exactly as the model produced it.
        arguments: String,
    },
    Unknown(ArbitraryJson),
}

impl Item {
    /// First transcript carried by this item's content, if any.
    #[must_use]
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::Message { content, .. } => content.iter().find_map(ContentPart::transcript),
            Self::FunctionCall { .. } | Self::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Message { .. } => "message",
            Self::FunctionCall { .. } => "function_call",
            Self::Unknown(_) => "unknown",
        };
        write!(f, "{label}")
    }
}

/// One part of a message item.
///
/// Kept loose on purpose: audio parts carry `transcript`, text parts carry
/// `text`, and newer part kinds should not break decoding.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl ContentPart {
    #[must_use]
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ItemRepr {
    Message {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        role: Option<Role>,
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        call_id: Option<String>,
        name: String,
        #[serde(default)]
        arguments: String,
    },
}

impl From<ItemRepr> for Item {
    fn from(repr: ItemRepr) -> Self {
        match repr {
            ItemRepr::Message { id, role, content } => Self::Message { id, role, content },
            ItemRepr::FunctionCall {
                id,
                call_id,
                name,
                arguments,
            } => Self::FunctionCall {
                id,
                call_id,
                name,
                arguments,
            },
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = ArbitraryJson::deserialize(deserializer)?;
        match ItemRepr::deserialize(value.clone()) {
            Ok(repr) => Ok(repr.into()),
            Err(err) => {
                tracing::debug!("Keeping output item as raw JSON: {err}");
                Ok(Self::Unknown(value))
            }
        }
    }
}
