//! Lifecycle event fan-out
//!
//! Backed by a `tokio::sync::broadcast` channel: publishing never blocks and
//! each subscriber gets every event sent after it subscribed.

use crate::meeting::types::MeetingEvent;
use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MeetingEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to all current subscribers.
    ///
    /// Returns how many received it; zero subscribers is not an error.
    pub fn publish(&self, event: MeetingEvent) -> usize {
        tracing::debug!("Meeting event: {}", event);
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MeetingEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
