use crate::protocol::models::Response;
use crate::protocol::server_events::ServerEvent;

/// Append-only record of inbound events for one session.
///
/// Ordering convention: oldest first, so the most recent event is always the
/// last element. Positions never change while the session lives, which makes
/// an index a stable identity for an event.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ServerEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its position.
    pub fn push(&mut self, event: ServerEvent) -> usize {
        self.events.push(event);
        self.events.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ServerEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerEvent> {
        self.events.iter()
    }

    /// Events appended at or after `from`.
    #[must_use]
    pub fn since(&self, from: usize) -> &[ServerEvent] {
        self.events.get(from..).unwrap_or_default()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ServerEvent> {
        self.events.last()
    }

    /// The most recent `response.done` and its position.
    #[must_use]
    pub fn latest_response_done(&self) -> Option<(usize, &Response)> {
        self.events
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, event)| match event {
                ServerEvent::ResponseDone { response, .. } => Some((index, response)),
                _ => None,
            })
    }

    /// Drop every event; used when the session ends.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Extend<ServerEvent> for EventLog {
    fn extend<T: IntoIterator<Item = ServerEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> ServerEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn latest_response_done_is_the_last_one_appended() {
        let mut log = EventLog::new();
        log.push(event(json!({ "type": "response.done", "response": { "id": "resp_1" } })));
        log.push(event(json!({ "type": "response.done", "response": { "id": "resp_2" } })));
        log.push(event(json!({ "type": "speech", "status": "end", "text": "bye" })));

        let (index, response) = log.latest_response_done().unwrap();
        assert_eq!(index, 1);
        assert_eq!(response.id.as_deref(), Some("resp_2"));
    }

    #[test]
    fn empty_log_has_no_response() {
        let log = EventLog::new();
        assert!(log.latest_response_done().is_none());
        assert!(log.latest().is_none());
        assert!(log.since(3).is_empty());
    }

    #[test]
    fn since_returns_the_tail() {
        let mut log = EventLog::new();
        log.extend([
            event(json!({ "type": "session.created", "session": {} })),
            event(json!({ "type": "input_audio_buffer.speech_started" })),
        ]);

        assert_eq!(log.since(1).len(), 1);
        assert_eq!(log.since(1)[0].event_type(), "input_audio_buffer.speech_started");
    }
}
