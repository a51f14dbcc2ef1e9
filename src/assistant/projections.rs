//! UI-facing state derived from the event log.
//!
//! Each projection lives in its own `watch` cell. The session holds the only
//! writer ([`ProjectionCells`]); any number of readers ([`Projections`]) can
//! poll the current value or wait for changes.

use tokio::sync::watch;

use super::speech::SpeechState;
use super::tools::DisplayImageArgs;
use crate::config::SpeechPalette;
use crate::form::HighlightSet;
use crate::{Error, Result};

/// The image most recently shown by a `display_image` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedImage {
    pub name: String,
    pub url: String,
    pub description: String,
}

impl From<DisplayImageArgs> for DisplayedImage {
    fn from(args: DisplayImageArgs) -> Self {
        Self {
            name: args.image_name,
            url: args.image_url,
            description: args.description,
        }
    }
}

/// Point-in-time copy of every projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSnapshot {
    pub highlights: HighlightSet,
    pub image: Option<DisplayedImage>,
    pub transcript: String,
    pub speech: SpeechState,
}

/// Create the writer/reader pair for a session's projections.
#[must_use]
pub fn channel(palette: &SpeechPalette) -> (ProjectionCells, Projections) {
    let initial_speech = SpeechState::idle(palette);
    let (highlights, highlights_rx) = watch::channel(HighlightSet::new());
    let (image, image_rx) = watch::channel(None);
    let (transcript, transcript_rx) = watch::channel(String::new());
    let (speech, speech_rx) = watch::channel(initial_speech.clone());

    let cells = ProjectionCells {
        highlights,
        image,
        transcript,
        speech,
        initial_speech,
    };
    let view = Projections {
        highlights: highlights_rx,
        image: image_rx,
        transcript: transcript_rx,
        speech: speech_rx,
    };
    (cells, view)
}

pub struct ProjectionCells {
    highlights: watch::Sender<HighlightSet>,
    image: watch::Sender<Option<DisplayedImage>>,
    transcript: watch::Sender<String>,
    speech: watch::Sender<SpeechState>,
    initial_speech: SpeechState,
}

impl ProjectionCells {
    /// Replace (never merge) the highlighted fields.
    pub fn set_highlights(&self, highlights: HighlightSet) -> bool {
        replace(&self.highlights, highlights)
    }

    pub fn show_image(&self, image: DisplayedImage) -> bool {
        replace(&self.image, Some(image))
    }

    pub fn set_transcript(&self, transcript: impl Into<String>) -> bool {
        replace(&self.transcript, transcript.into())
    }

    pub fn set_speech(&self, speech: SpeechState) -> bool {
        replace(&self.speech, speech)
    }

    #[must_use]
    pub fn speech(&self) -> SpeechState {
        self.speech.borrow().clone()
    }

    /// Put every projection back to its initial value.
    pub fn reset(&self) {
        replace(&self.highlights, HighlightSet::new());
        replace(&self.image, None);
        replace(&self.transcript, String::new());
        replace(&self.speech, self.initial_speech.clone());
    }

    #[must_use]
    pub fn subscribe(&self) -> Projections {
        Projections {
            highlights: self.highlights.subscribe(),
            image: self.image.subscribe(),
            transcript: self.transcript.subscribe(),
            speech: self.speech.subscribe(),
        }
    }
}

fn replace<T: PartialEq>(cell: &watch::Sender<T>, value: T) -> bool {
    cell.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    })
}

/// Read side of the projections, cheap to clone.
#[derive(Debug, Clone)]
pub struct Projections {
    highlights: watch::Receiver<HighlightSet>,
    image: watch::Receiver<Option<DisplayedImage>>,
    transcript: watch::Receiver<String>,
    speech: watch::Receiver<SpeechState>,
}

impl Projections {
    #[must_use]
    pub fn highlights(&self) -> HighlightSet {
        self.highlights.borrow().clone()
    }

    #[must_use]
    pub fn image(&self) -> Option<DisplayedImage> {
        self.image.borrow().clone()
    }

    #[must_use]
    pub fn transcript(&self) -> String {
        self.transcript.borrow().clone()
    }

    #[must_use]
    pub fn speech(&self) -> SpeechState {
        self.speech.borrow().clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            highlights: self.highlights(),
            image: self.image(),
            transcript: self.transcript(),
            speech: self.speech(),
        }
    }

    /// Wait until any projection changes.
    ///
    /// # Errors
    /// Returns `ConnectionClosed` once the owning session is gone.
    pub async fn changed(&mut self) -> Result<()> {
        let result = tokio::select! {
            r = self.highlights.changed() => r,
            r = self.image.changed() => r,
            r = self.transcript.changed() => r,
            r = self.speech.changed() => r,
        };
        result.map_err(|_| Error::ConnectionClosed)
    }
}
