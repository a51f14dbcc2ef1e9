use serde_json::Value;

use crate::config::SpeechPalette;
use crate::protocol::server_events::{ServerEvent, SpeechStatus};

const AGENT_SPEAKER: &str = "agent";

/// Live speech indicator: is someone speaking, in which color, saying what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechState {
    pub active: bool,
    pub color: String,
    pub text: String,
}

impl SpeechState {
    #[must_use]
    pub fn idle(palette: &SpeechPalette) -> Self {
        Self {
            active: false,
            color: palette.idle.clone(),
            text: String::new(),
        }
    }

    /// Color the waveform should be drawn with right now.
    #[must_use]
    pub fn display_color<'a>(&'a self, palette: &'a SpeechPalette) -> &'a str {
        if self.active { &self.color } else { &palette.idle }
    }

    /// Advance the state machine by one speech event.
    ///
    /// Returns `false` when the status is not recognized; the state is left
    /// untouched in that case.
    pub fn apply(
        &mut self,
        status: &SpeechStatus,
        speaker: Option<&str>,
        text: &Value,
        palette: &SpeechPalette,
    ) -> bool {
        match status {
            SpeechStatus::Start => {
                tracing::debug!("Speech started: {text}");
                self.active = true;
                self.color = if speaker == Some(AGENT_SPEAKER) {
                    palette.agent.clone()
                } else {
                    palette.user.clone()
                };
                self.text = spoken_text(text);
            }
            SpeechStatus::Update => {
                tracing::debug!("Speech updated: {text}");
                self.text = spoken_text(text);
            }
            SpeechStatus::End => {
                tracing::debug!("Speech ended: {text}");
                self.active = false;
                self.text = spoken_text(text);
            }
            SpeechStatus::Other(other) => {
                tracing::warn!("Unknown speech status: {other}");
                return false;
            }
        }
        true
    }

    /// Fold every speech event in `events` (oldest first) into `self`.
    pub fn replay<'a, I>(&mut self, events: I, palette: &SpeechPalette)
    where
        I: IntoIterator<Item = &'a ServerEvent>,
    {
        for event in events {
            if let ServerEvent::Speech { status, speaker, text, .. } = event {
                self.apply(status, speaker.as_deref(), text, palette);
            }
        }
    }
}

/// Strings are shown as-is; structured values as compact JSON.
fn spoken_text(text: &Value) -> String {
    match text {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
