#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

pub mod assistant;
pub mod config;
pub mod error;
pub mod form;
pub mod protocol;

pub use assistant::{
    Assistant, DisplayedImage, Effect, EventLog, Outbound, ProjectionSnapshot, Projections,
    SessionState, SpeechState, ToolCall, ToolName, ToolRegistry,
};
pub use config::{AssistantConfig, AssistantConfigBuilder, ImageAsset, SpeechPalette};
pub use error::{Error, Result, ServerError};
pub use form::{Answer, FieldValue, FormField, HighlightSet, Submission, TaxForm};
pub use protocol::client_events::ClientEvent;
pub use protocol::server_events::{ServerEvent, SpeechStatus};
