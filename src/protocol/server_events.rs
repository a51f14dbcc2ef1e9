use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::models::{ArbitraryJson, Response};
use crate::error::ServerError;

/// Inbound events the assistant reacts to.
///
/// Every other event type the realtime model emits is kept as `Unknown`.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    Error {
        event_id: Option<String>,
        error: ServerError,
    },
    SessionCreated {
        event_id: Option<String>,
        /// Session details are not interpreted here.
        session: ArbitraryJson,
    },
    ResponseDone {
        event_id: Option<String>,
        response: Response,
    },
    Speech {
        event_id: Option<String>,
        status: SpeechStatus,
        speaker: Option<String>,
        /// Either a plain string or a structured value.
        text: ArbitraryJson,
    },
    Unknown(ArbitraryJson),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpeechStatus {
    Start,
    Update,
    End,
    Other(String),
}

impl From<String> for SpeechStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "start" => Self::Start,
            "update" => Self::Update,
            "end" => Self::End,
            _ => Self::Other(value),
        }
    }
}

impl From<SpeechStatus> for String {
    fn from(status: SpeechStatus) -> Self {
        match status {
            SpeechStatus::Start => "start".to_string(),
            SpeechStatus::Update => "update".to_string(),
            SpeechStatus::End => "end".to_string(),
            SpeechStatus::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ServerEventRepr {
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        event_id: Option<String>,
        error: ServerError,
    },
    #[serde(rename = "session.created")]
    SessionCreated {
        #[serde(default)]
        event_id: Option<String>,
        #[serde(default)]
        session: ArbitraryJson,
    },
    #[serde(rename = "response.done")]
    ResponseDone {
        #[serde(default)]
        event_id: Option<String>,
        #[serde(default)]
        response: Response,
    },
    #[serde(rename = "speech")]
    Speech {
        #[serde(default)]
        event_id: Option<String>,
        status: SpeechStatus,
        #[serde(default)]
        speaker: Option<String>,
        #[serde(default)]
        text: ArbitraryJson,
    },
}

impl From<ServerEventRepr> for ServerEvent {
    fn from(repr: ServerEventRepr) -> Self {
        match repr {
            ServerEventRepr::Error { event_id, error } => Self::Error { event_id, error },
            ServerEventRepr::SessionCreated { event_id, session } => {
                Self::SessionCreated { event_id, session }
            }
            ServerEventRepr::ResponseDone { event_id, response } => {
                Self::ResponseDone { event_id, response }
            }
            ServerEventRepr::Speech {
                event_id,
                status,
                speaker,
                text,
            } => Self::Speech {
                event_id,
                status,
                speaker,
                text,
            },
        }
    }
}

impl<'de> Deserialize<'de> for ServerEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = ArbitraryJson::deserialize(deserializer)?;
        if value.get("type").and_then(ArbitraryJson::as_str).is_none() {
            return Err(D::Error::custom("event is missing a string `type` field"));
        }
        match ServerEventRepr::deserialize(value.clone()) {
            Ok(repr) => Ok(repr.into()),
            Err(err) => {
                tracing::debug!("Failed to parse ServerEvent: {err}");
                Ok(Self::Unknown(value))
            }
        }
    }
}

impl ServerEvent {
    /// The `type` discriminator as it appeared on the wire.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::Error { .. } => "error",
            Self::SessionCreated { .. } => "session.created",
            Self::ResponseDone { .. } => "response.done",
            Self::Speech { .. } => "speech",
            Self::Unknown(value) => value
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("<untyped>"),
        }
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Error { event_id, .. }
            | Self::SessionCreated { event_id, .. }
            | Self::ResponseDone { event_id, .. }
            | Self::Speech { event_id, .. } => event_id.as_deref(),
            Self::Unknown(value) => value.get("event_id").and_then(|v| v.as_str()),
        }
    }

    /// Strip an unrecognized event down to its `type` and `event_id`.
    ///
    /// Recognized events are returned unchanged.
    #[must_use]
    pub fn without_payload(self) -> Self {
        match self {
            Self::Unknown(ArbitraryJson::Object(mut fields)) => {
                fields.retain(|key, _| key == "type" || key == "event_id");
                Self::Unknown(ArbitraryJson::Object(fields))
            }
            other => other,
        }
    }

    #[must_use]
    pub const fn is_session_created(&self) -> bool {
        matches!(self, Self::SessionCreated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::models::Item;
    use serde_json::json;

    #[test]
    fn response_done_decodes_outputs() {
        let evt: ServerEvent = serde_json::from_value(json!({
            "type": "response.done",
            "event_id": "evt_1",
            "response": {
                "id": "resp_1",
                "status": "completed",
                "output": [
                    { "type": "function_call", "name": "highlight_form_fields", "arguments": "{}" }
                ]
            }
        }))
        .unwrap();

        match evt {
            ServerEvent::ResponseDone { response, .. } => {
                assert_eq!(response.id.as_deref(), Some("resp_1"));
                assert!(matches!(response.outputs()[0], Item::FunctionCall { .. }));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn speech_status_keeps_unrecognized_values() {
        let evt: ServerEvent = serde_json::from_value(json!({
            "type": "speech",
            "status": "paused",
            "speaker": "agent",
            "text": "hm"
        }))
        .unwrap();

        match evt {
            ServerEvent::Speech { status, .. } => {
                assert_eq!(status, SpeechStatus::Other("paused".to_string()));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_preserved_with_its_tag() {
        let evt: ServerEvent = serde_json::from_value(json!({
            "type": "response.output_audio.delta",
            "event_id": "evt_9",
            "delta": "AAAA"
        }))
        .unwrap();

        assert!(matches!(evt, ServerEvent::Unknown(_)));
        assert_eq!(evt.event_type(), "response.output_audio.delta");
        assert_eq!(evt.event_id(), Some("evt_9"));
    }

    #[test]
    fn frames_without_a_type_are_rejected() {
        assert!(serde_json::from_str::<ServerEvent>("42").is_err());
        assert!(serde_json::from_value::<ServerEvent>(json!({ "no_type": true })).is_err());
        assert!(serde_json::from_value::<ServerEvent>(json!({ "type": 7 })).is_err());
    }

    #[test]
    fn without_payload_keeps_only_the_tags() {
        let evt: ServerEvent = serde_json::from_value(json!({
            "type": "response.output_audio.delta",
            "event_id": "evt_3",
            "delta": "AAAA"
        }))
        .unwrap();

        let ServerEvent::Unknown(value) = evt.without_payload() else {
            panic!("expected unknown event");
        };
        assert_eq!(value, json!({ "type": "response.output_audio.delta", "event_id": "evt_3" }));
    }

    #[test]
    fn error_event_decodes_server_error() {
        let evt: ServerEvent = serde_json::from_value(json!({
            "type": "error",
            "event_id": "evt_2",
            "error": { "type": "invalid_request_error", "message": "bad tool" }
        }))
        .unwrap();

        match evt {
            ServerEvent::Error { error, .. } => assert_eq!(error.message, "bad tool"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
