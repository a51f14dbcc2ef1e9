use super::log::EventLog;
use super::projections::DisplayedImage;
use super::tools::{ToolCall, ToolName};
use crate::config::AssistantConfig;
use crate::form::HighlightSet;
use crate::protocol::models::{Item, Response};

/// A change the session must apply after a completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowImage(DisplayedImage),
    /// Full replacement of the highlighted fields.
    Highlight(HighlightSet),
    Transcript(String),
    /// Ask the model to continue once the UI has caught up.
    FollowUp {
        tool: ToolName,
        instructions: String,
    },
}

/// Turns the most recent `response.done` into effects, once per event.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    image_follow_up: String,
    highlight_follow_up: String,
    dispatched: Option<usize>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            image_follow_up: config.image_follow_up.clone(),
            highlight_follow_up: config.highlight_follow_up.clone(),
            dispatched: None,
        }
    }

    /// Position of the last `response.done` that was dispatched.
    #[must_use]
    pub const fn last_dispatched(&self) -> Option<usize> {
        self.dispatched
    }

    /// The most recent `response.done` in `log` and its position.
    #[must_use]
    pub fn latest_response(log: &EventLog) -> Option<(usize, &Response)> {
        log.latest_response_done()
    }

    /// Dispatch the latest `response.done` if it has not been seen yet.
    ///
    /// Identity is the event's position in the log, so calling this again on
    /// an unchanged log yields nothing.
    pub fn dispatch(&mut self, log: &EventLog) -> Vec<Effect> {
        let Some((index, response)) = Self::latest_response(log) else {
            return Vec::new();
        };
        if self.dispatched == Some(index) {
            tracing::trace!("response.done at {index} already dispatched");
            return Vec::new();
        }
        self.dispatched = Some(index);
        tracing::debug!(
            "Dispatching response.done at {index} ({} output item(s))",
            response.outputs().len()
        );
        self.process(response)
    }

    /// Apply the per-item policy to every output, in order.
    #[must_use]
    pub fn process(&self, response: &Response) -> Vec<Effect> {
        let mut effects = Vec::new();
        for item in response.outputs() {
            match item {
                Item::FunctionCall { name, call_id, arguments, .. } => {
                    match ToolCall::decode(name, arguments) {
                        Ok(call) => self.apply_call(call, &mut effects),
                        Err(err) => {
                            tracing::warn!(call_id = ?call_id, "Skipping function call: {err}");
                        }
                    }
                }
                other => {
                    if let Some(transcript) = other.transcript() {
                        tracing::debug!("Audio transcript received: {transcript}");
                        effects.push(Effect::Transcript(transcript.to_string()));
                    }
                }
            }
        }
        effects
    }

    /// Forget what was dispatched; the log is about to be discarded.
    pub fn reset(&mut self) {
        self.dispatched = None;
    }

    fn apply_call(&self, call: ToolCall, effects: &mut Vec<Effect>) {
        let tool = call.name();
        match call {
            ToolCall::DisplayImage(args) => {
                tracing::info!("Displaying image {:?} ({})", args.image_name, args.image_url);
                effects.push(Effect::ShowImage(args.into()));
                effects.push(Effect::FollowUp {
                    tool,
                    instructions: self.image_follow_up.clone(),
                });
            }
            ToolCall::HighlightFormFields(args) => {
                tracing::info!("Highlighting fields: {:?}", args.fields_to_highlight);
                effects.push(Effect::Highlight(args.to_set()));
                effects.push(Effect::FollowUp {
                    tool,
                    instructions: self.highlight_follow_up.clone(),
                });
            }
        }
    }
}
