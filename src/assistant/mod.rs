//! The voice form assistant.
//!
//! An [`Assistant`] consumes server events from the realtime model, announces
//! the form tools once per session, applies tool calls to the UI projections
//! and asks the model to continue after each call.

pub mod dispatcher;
pub mod log;
pub mod outbound;
pub mod projections;
pub mod schedule;
pub mod session;
pub mod speech;
pub mod tools;

pub use dispatcher::{Dispatcher, Effect};
pub use log::EventLog;
pub use outbound::Outbound;
pub use projections::{DisplayedImage, ProjectionSnapshot, Projections};
pub use schedule::{ScheduledSend, Scheduler};
pub use session::{Assistant, SessionState};
pub use speech::SpeechState;
pub use tools::{
    DisplayImageArgs, HighlightFormFieldsArgs, ToolCall, ToolDefinition, ToolName, ToolRegistry,
};
