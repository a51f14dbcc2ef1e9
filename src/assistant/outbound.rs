use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::protocol::client_events::ClientEvent;
use crate::{Error, Result};

/// Capability to deliver a message to the realtime model.
///
/// The transport owns the connection; the assistant only hands it events.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send(&self, event: ClientEvent) -> Result<()>;
}

#[async_trait]
impl Outbound for mpsc::Sender<ClientEvent> {
    async fn send(&self, event: ClientEvent) -> Result<()> {
        mpsc::Sender::send(self, event)
            .await
            .map_err(|_| Error::ConnectionClosed)
    }
}

#[async_trait]
impl Outbound for mpsc::UnboundedSender<ClientEvent> {
    async fn send(&self, event: ClientEvent) -> Result<()> {
        mpsc::UnboundedSender::send(self, event).map_err(|_| Error::ConnectionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_sender_forwards_events() {
        let (tx, mut rx) = mpsc::channel(1);
        Outbound::send(&tx, ClientEvent::continue_with("go on")).await.unwrap();
        assert_eq!(rx.recv().await, Some(ClientEvent::continue_with("go on")));
    }

    #[tokio::test]
    async fn closed_channel_reports_connection_closed() {
        let (tx, rx) = mpsc::unbounded_channel::<ClientEvent>();
        drop(rx);
        let err = Outbound::send(&tx, ClientEvent::continue_with("x")).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }
}
