use std::borrow::Cow;
use std::sync::Arc;

use futures::{Stream, StreamExt};

use super::dispatcher::{Dispatcher, Effect};
use super::log::EventLog;
use super::outbound::Outbound;
use super::projections::{self, ProjectionCells, Projections};
use super::schedule::Scheduler;
use super::tools::ToolRegistry;
use crate::config::AssistantConfig;
use crate::protocol::client_events::ClientEvent;
use crate::protocol::server_events::ServerEvent;
use crate::Result;

const TRACE_LOG_MAX_BYTES: usize = 1024;
const TRACE_TRUNCATE_SUFFIX: &str = "... (truncated)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Inactive,
    Active,
}

/// Drives one voice session: owns the event log and turns it into tool
/// announcements, projection updates and deferred follow-ups.
///
/// All state is owned here and mutated through `&mut self`; the outside world
/// observes it through [`Projections`].
pub struct Assistant {
    config: AssistantConfig,
    tools: ToolRegistry,
    outbound: Arc<dyn Outbound>,
    state: SessionState,
    announced: bool,
    dispatcher: Dispatcher,
    scheduler: Scheduler,
    cells: ProjectionCells,
    log: EventLog,
    speech_cursor: usize,
}

impl Assistant {
    #[must_use]
    pub fn new<O>(config: AssistantConfig, outbound: O) -> Self
    where
        O: Outbound + 'static,
    {
        Self::with_outbound(config, Arc::new(outbound))
    }

    #[must_use]
    pub fn with_outbound(config: AssistantConfig, outbound: Arc<dyn Outbound>) -> Self {
        let tools = ToolRegistry::for_form(&config);
        let dispatcher = Dispatcher::new(&config);
        let scheduler = Scheduler::new(Arc::clone(&outbound), config.follow_up_delay);
        let (cells, _) = projections::channel(&config.palette);
        Self {
            config,
            tools,
            outbound,
            state: SessionState::Inactive,
            announced: false,
            dispatcher,
            scheduler,
            cells,
            log: EventLog::new(),
            speech_cursor: 0,
        }
    }

    /// A new reader over the UI projections.
    #[must_use]
    pub fn projections(&self) -> Projections {
        self.cells.subscribe()
    }

    #[must_use]
    pub const fn config(&self) -> &AssistantConfig {
        &self.config
    }

    #[must_use]
    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    #[must_use]
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Whether the tools have been announced since the last reset.
    #[must_use]
    pub const fn is_announced(&self) -> bool {
        self.announced
    }

    /// Deferred follow-ups that have not gone out yet.
    #[must_use]
    pub fn pending_sends(&self) -> usize {
        self.scheduler.pending()
    }

    /// Start the session and process anything already in the log.
    pub async fn activate(&mut self) {
        if self.is_active() {
            tracing::debug!("Session already active");
        } else {
            tracing::info!("Session activated");
            self.state = SessionState::Active;
        }
        self.sync().await;
    }

    /// End the session and put everything back to its initial state.
    pub fn deactivate(&mut self) {
        self.state = SessionState::Inactive;
        self.announced = false;
        let cancelled = self.scheduler.cancel_all();
        self.log.clear();
        self.dispatcher.reset();
        self.speech_cursor = 0;
        self.cells.reset();
        tracing::info!("Session deactivated ({cancelled} pending send(s) cancelled)");
    }

    /// Append an inbound event and react to it. Returns its position in the log.
    pub async fn push(&mut self, event: ServerEvent) -> usize {
        match &event {
            ServerEvent::Error { error, .. } => {
                tracing::error!(
                    code = ?error.code,
                    param = ?error.param,
                    "Server error ({:?}): {}",
                    error.error_type,
                    error.message
                );
            }
            ServerEvent::Unknown(_) => {
                tracing::warn!("Unhandled event type: {}", event.event_type());
            }
            _ => {}
        }
        let index = self.log.push(event.without_payload());
        self.sync().await;
        index
    }

    /// Decode a raw JSON frame and [`push`](Self::push) it.
    ///
    /// # Errors
    /// Returns an error if the frame is not JSON or has no string `type`;
    /// nothing is appended in that case.
    pub async fn push_json(&mut self, frame: &str) -> Result<usize> {
        tracing::trace!("Received event: {}", safe_truncate(frame, TRACE_LOG_MAX_BYTES));
        let event: ServerEvent = serde_json::from_str(frame)?;
        Ok(self.push(event).await)
    }

    /// Consume `events` in order until the stream ends. Returns how many were
    /// pushed.
    pub async fn run<S>(&mut self, mut events: S) -> usize
    where
        S: Stream<Item = ServerEvent> + Unpin,
    {
        let mut count = 0;
        while let Some(event) = events.next().await {
            self.push(event).await;
            count += 1;
        }
        tracing::debug!("Event stream ended after {count} event(s)");
        count
    }

    /// Bring every derived piece of state up to date with the log.
    ///
    /// Safe to call any number of times; nothing is announced, dispatched or
    /// scheduled twice for the same events.
    pub async fn sync(&mut self) {
        if !self.is_active() {
            tracing::trace!("Inactive, {} event(s) held", self.log.len());
            return;
        }
        self.announce_tools().await;
        self.fold_speech();
        for effect in self.dispatcher.dispatch(&self.log) {
            self.apply(effect);
        }
    }

    async fn announce_tools(&mut self) {
        if self.announced || !self.log.iter().any(ServerEvent::is_session_created) {
            return;
        }
        let event = match self.tools.session_update() {
            Ok(event) => event,
            Err(err) => {
                tracing::error!("Failed to build tool announcement: {err}");
                return;
            }
        };
        match self.outbound.send(event).await {
            Ok(()) => {
                self.announced = true;
                tracing::info!("Announced {} tool(s)", self.tools.definitions().len());
            }
            Err(err) => tracing::warn!("Tool announcement failed, will retry: {err}"),
        }
    }

    fn fold_speech(&mut self) {
        let fresh = self.log.since(self.speech_cursor);
        if fresh.is_empty() {
            return;
        }
        let mut speech = self.cells.speech();
        speech.replay(fresh, &self.config.palette);
        self.speech_cursor = self.log.len();
        self.cells.set_speech(speech);
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ShowImage(image) => {
                self.cells.show_image(image);
            }
            Effect::Highlight(highlights) => {
                self.cells.set_highlights(highlights);
            }
            Effect::Transcript(transcript) => {
                self.cells.set_transcript(transcript);
            }
            Effect::FollowUp { tool, instructions } => {
                let event = ClientEvent::continue_with(instructions);
                if let Err(err) = self.scheduler.schedule(event) {
                    tracing::warn!("Could not schedule follow-up for {tool}: {err}");
                }
            }
        }
    }
}

fn safe_truncate(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!(
        "{} {} {} bytes",
        &s[..end],
        TRACE_TRUNCATE_SUFFIX,
        s.len() - end
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    fn event(value: serde_json::Value) -> ServerEvent {
        serde_json::from_value(value).unwrap()
    }

    fn session_created() -> ServerEvent {
        event(serde_json::json!({ "type": "session.created", "session": {} }))
    }

    fn assistant() -> (Assistant, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Assistant::new(AssistantConfig::default(), tx), rx)
    }

    /// Fails the first `failures` sends, then records everything.
    struct Flaky {
        failures: AtomicUsize,
        sent: mpsc::UnboundedSender<ClientEvent>,
    }

    #[async_trait]
    impl Outbound for Flaky {
        async fn send(&self, event: ClientEvent) -> Result<()> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(Error::ConnectionClosed);
            }
            self.sent.send(event).map_err(|_| Error::ConnectionClosed)
        }
    }

    #[tokio::test]
    async fn events_are_held_until_activation() {
        let (mut assistant, mut rx) = assistant();
        assistant.push(session_created()).await;
        assert!(rx.try_recv().is_err());
        assert!(!assistant.is_announced());

        assistant.activate().await;
        assert!(matches!(rx.try_recv(), Ok(ClientEvent::SessionUpdate { .. })));
        assert!(assistant.is_announced());
    }

    #[tokio::test]
    async fn failed_announcement_is_retried() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let flaky = Flaky { failures: AtomicUsize::new(1), sent: tx };
        let mut assistant = Assistant::new(AssistantConfig::default(), flaky);
        assistant.activate().await;

        assistant.push(session_created()).await;
        assert!(!assistant.is_announced());
        assert!(rx.try_recv().is_err());

        assistant.sync().await;
        assert!(assistant.is_announced());
        assert!(matches!(rx.try_recv(), Ok(ClientEvent::SessionUpdate { .. })));
    }

    #[tokio::test]
    async fn malformed_frame_is_rejected_without_touching_the_log() {
        let (mut assistant, _rx) = assistant();
        assistant.activate().await;

        assert!(matches!(assistant.push_json("not json").await, Err(Error::Serialization(_))));
        assert!(assistant.log().is_empty());

        assert!(matches!(assistant.push_json("42").await, Err(Error::Serialization(_))));
        assert!(matches!(
            assistant.push_json(r#"{"no_type":true}"#).await,
            Err(Error::Serialization(_))
        ));
        assert!(assistant.log().is_empty());

        let index = assistant.push_json(r#"{"type":"rate_limits.updated"}"#).await.unwrap();
        assert_eq!(index, 0);
    }

    #[tokio::test]
    async fn unrecognized_events_are_logged_without_payload() {
        let (mut assistant, _rx) = assistant();
        assistant
            .push_json(r#"{"type":"response.output_audio.delta","event_id":"evt_1","delta":"AAAAAAAA"}"#)
            .await
            .unwrap();

        let Some(ServerEvent::Unknown(stored)) = assistant.log().latest() else {
            panic!("expected an unknown event in the log");
        };
        assert!(stored.get("delta").is_none());
        assert_eq!(assistant.log().latest().unwrap().event_type(), "response.output_audio.delta");
        assert_eq!(assistant.log().latest().unwrap().event_id(), Some("evt_1"));
    }

    #[tokio::test]
    async fn server_errors_change_nothing() {
        let (mut assistant, mut rx) = assistant();
        assistant.activate().await;
        let view = assistant.projections();
        let before = view.snapshot();

        assistant
            .push_json(r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad"}}"#)
            .await
            .unwrap();

        assert_eq!(view.snapshot(), before);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_consumes_the_stream_in_order() {
        let (mut assistant, mut rx) = assistant();
        assistant.activate().await;
        let events = futures::stream::iter(vec![
            session_created(),
            event(serde_json::json!({
                "type": "speech",
                "status": "start",
                "speaker": "agent",
                "text": "Hi"
            })),
        ]);

        assert_eq!(assistant.run(events).await, 2);
        assert!(matches!(rx.try_recv(), Ok(ClientEvent::SessionUpdate { .. })));
        assert!(assistant.projections().speech().active);
    }

    #[test]
    fn safe_truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        let truncated = safe_truncate(&text, 5);
        assert!(truncated.starts_with("éé "));
        assert!(truncated.ends_with("16 bytes"));
        assert_eq!(safe_truncate("short", 10), "short");
    }
}
