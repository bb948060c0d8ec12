//! Change notification intake.
//!
//! Database change notifications arrive over NATS as JSON payloads. A
//! background task owns the subscription and forwards parsed notifications
//! into a bounded channel; the tick loop drains that channel synchronously
//! at the top of each tick, so intake never blocks the animation. Malformed
//! payloads are logged and skipped, never surfaced as errors.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use pulseboard_types::ChangeNotification;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Depth of the intake channel. Bursts beyond this are dropped by the
/// forwarding task rather than ballooning memory.
const INTAKE_CHANNEL_DEPTH: usize = 1024;

/// Errors that can occur while setting up the change source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Failed to connect to or communicate with the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),
}

/// One event drained from a change source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A parsed change notification.
    Change(ChangeNotification),

    /// The source's connection state changed.
    ConnectionStatus(bool),
}

/// A source of change notifications the tick loop can drain without
/// blocking.
pub trait ChangeSource {
    /// Take every event that arrived since the last drain, in arrival order.
    fn drain_pending(&mut self) -> Vec<SourceEvent>;

    /// Whether the source currently believes it is connected.
    fn is_connected(&self) -> bool;

    /// Stop the source and release its connection.
    fn disconnect(&mut self);
}

/// NATS-backed change source.
///
/// Owns a forwarding task that reads the subscription and parses each
/// payload into a [`ChangeNotification`]. The task ends (and reports a
/// final disconnect) when the subscription closes.
pub struct NatsChangeSource {
    receiver: mpsc::Receiver<SourceEvent>,
    connected: Arc<AtomicBool>,
    forward_task: Option<tokio::task::JoinHandle<()>>,
}

impl NatsChangeSource {
    /// Connect to a NATS server and subscribe to the change subject.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Nats`] if the connection or subscription
    /// cannot be established.
    pub async fn connect(url: &str, subject: &str) -> Result<Self, SourceError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| SourceError::Nats(format!("failed to connect to {url}: {e}")))?;

        debug!(subject = subject, "subscribing to change subject");
        let mut subscriber = client
            .subscribe(subject.to_owned())
            .await
            .map_err(|e| SourceError::Nats(format!("failed to subscribe to {subject}: {e}")))?;
        info!(subject = subject, "change subscription established");

        let (sender, receiver) = mpsc::channel(INTAKE_CHANNEL_DEPTH);
        let connected = Arc::new(AtomicBool::new(true));
        let task_connected = Arc::clone(&connected);

        let forward_task = tokio::spawn(async move {
            // Keep the client alive for the lifetime of the subscription.
            let _client = client;

            while let Some(message) = subscriber.next().await {
                match serde_json::from_slice::<ChangeNotification>(&message.payload) {
                    Ok(notification) => {
                        if sender
                            .try_send(SourceEvent::Change(notification))
                            .is_err()
                        {
                            warn!("intake channel full or closed, dropping notification");
                        }
                    }
                    Err(e) => {
                        warn!(
                            subject = %message.subject,
                            error = %e,
                            "failed to parse change notification, skipping"
                        );
                    }
                }
            }

            info!("change subscription ended");
            task_connected.store(false, Ordering::SeqCst);
            let _ = sender.try_send(SourceEvent::ConnectionStatus(false));
        });

        Ok(Self {
            receiver,
            connected,
            forward_task: Some(forward_task),
        })
    }
}

impl ChangeSource for NatsChangeSource {
    fn drain_pending(&mut self) -> Vec<SourceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn disconnect(&mut self) {
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
        self.connected.store(false, Ordering::SeqCst);
        self.receiver.close();
        info!("change source disconnected");
    }
}

impl std::fmt::Debug for NatsChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsChangeSource")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl Drop for NatsChangeSource {
    fn drop(&mut self) {
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
    }
}

/// In-memory change source for tests and headless demos.
#[derive(Debug, Default)]
pub struct QueueChangeSource {
    pending: std::collections::VecDeque<SourceEvent>,
    connected: bool,
}

impl QueueChangeSource {
    /// Create an empty, connected source.
    pub fn new() -> Self {
        Self {
            pending: std::collections::VecDeque::new(),
            connected: true,
        }
    }

    /// Queue a change notification for the next drain.
    pub fn push_change(&mut self, notification: ChangeNotification) {
        self.pending.push_back(SourceEvent::Change(notification));
    }

    /// Queue a connection status transition for the next drain.
    pub fn push_status(&mut self, connected: bool) {
        self.connected = connected;
        self.pending
            .push_back(SourceEvent::ConnectionStatus(connected));
    }
}

impl ChangeSource for QueueChangeSource {
    fn drain_pending(&mut self) -> Vec<SourceEvent> {
        self.pending.drain(..).collect()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.pending.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn change_payload() -> ChangeNotification {
        serde_json::from_value(serde_json::json!({
            "messageType": "database",
            "operation": "INSERT",
            "table": "tasks",
            "newImage": { "id": 1, "name": "Ship it", "userId": 7 }
        }))
        .unwrap()
    }

    #[test]
    fn queue_source_drains_in_order() {
        let mut source = QueueChangeSource::new();
        source.push_change(change_payload());
        source.push_status(false);

        let events = source.drain_pending();
        assert_eq!(events.len(), 2);
        assert!(matches!(events.first(), Some(SourceEvent::Change(_))));
        assert_eq!(events.get(1), Some(&SourceEvent::ConnectionStatus(false)));
        assert!(source.drain_pending().is_empty());
        assert!(!source.is_connected());
    }

    #[test]
    fn disconnect_clears_the_queue() {
        let mut source = QueueChangeSource::new();
        source.push_change(change_payload());
        source.disconnect();
        assert!(source.drain_pending().is_empty());
        assert!(!source.is_connected());
    }

    // Integration tests that require a live NATS server are marked #[ignore].
    #[tokio::test]
    #[ignore]
    async fn connect_to_nats() {
        let result = NatsChangeSource::connect("nats://localhost:4222", "changes.>").await;
        assert!(result.is_ok());
    }
}
