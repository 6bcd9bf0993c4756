//! Broadcast channel for dashboard events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Each recomputed
//! view publishes a [`DashboardEvent`] through the bus, and every WebSocket
//! connection subscribes to receive the topics it asked for. It is the one
//! place components signal each other; there are no global flags.

use tokio::sync::broadcast;

use super::DashboardEvent;

/// Broadcast bus for [`DashboardEvent`]s.
///
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers. Views are full replacements, so a lagging client only misses
/// intermediate states.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: DashboardEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
