//! Session event bus
//!
//! One `tokio::sync::broadcast` channel carries every [`RoomEvent`].
//! [`EventBus::subscribe`] yields a raw receiver for all events;
//! [`EventBus::on`] yields a subscription filtered to one kind.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use super::{EventKind, RoomEvent};

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast bus for domain events
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<RoomEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus holding up to `capacity` unread events per subscriber
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Publish an event
    ///
    /// Returns the number of subscribers that will see it.
    pub fn emit(&self, event: RoomEvent) -> usize {
        let kind = event.kind();
        let delivered = self.tx.send(event).unwrap_or(0);

        tracing::trace!(event = %kind, subscribers = delivered, "Event published");
        delivered
    }

    /// Receive every event
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.tx.subscribe()
    }

    /// Receive events of one kind
    pub fn on(&self, kind: EventKind) -> EventSubscription {
        EventSubscription {
            kind,
            rx: self.tx.subscribe(),
        }
    }

    /// Stop receiving on a subscription
    pub fn off(&self, subscription: EventSubscription) {
        tracing::trace!(event = %subscription.kind, "Subscription dropped");
        drop(subscription);
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Disconnect every current subscriber
    ///
    /// Subscribers drain what was already published, then see the end of
    /// the stream. Later subscriptions attach to a fresh channel.
    pub fn close(&mut self) {
        let (tx, _) = broadcast::channel(self.capacity);
        let old = std::mem::replace(&mut self.tx, tx);

        tracing::debug!(subscribers = old.receiver_count(), "Event bus closed");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Subscription to one event kind
#[derive(Debug)]
pub struct EventSubscription {
    kind: EventKind,
    rx: broadcast::Receiver<RoomEvent>,
}

impl EventSubscription {
    /// Kind this subscription receives
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Next matching event; `None` once the bus is closed
    pub async fn recv(&mut self) -> Option<RoomEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.kind() == self.kind => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(event = %self.kind, skipped, "Subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event if one is already queued
    pub fn try_recv(&mut self) -> Option<RoomEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.kind() == self.kind => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(event = %self.kind, skipped, "Subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(user_id: &str) -> RoomEvent {
        RoomEvent::RemoteUserJoin {
            user_id: user_id.to_string(),
        }
    }

    #[test]
    fn test_filtered_subscription() {
        let bus = EventBus::default();
        let mut joins = bus.on(EventKind::RemoteUserJoin);
        let mut all = bus.subscribe();

        bus.emit(RoomEvent::LocalLeave);
        bus.emit(join("u1"));

        assert_eq!(joins.try_recv(), Some(join("u1")));
        assert_eq!(joins.try_recv(), None);
        assert_eq!(all.try_recv().unwrap(), RoomEvent::LocalLeave);
        assert_eq!(all.try_recv().unwrap(), join("u1"));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(4);
        assert_eq!(bus.emit(join("u1")), 0);

        let sub = bus.on(EventKind::LocalJoin);
        assert_eq!(bus.subscriber_count(), 1);
        bus.off(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_lagged_subscriber_keeps_newest() {
        let bus = EventBus::new(2);
        let mut joins = bus.on(EventKind::RemoteUserJoin);

        for user in ["a", "b", "c", "d"] {
            bus.emit(join(user));
        }

        assert_eq!(joins.try_recv(), Some(join("c")));
        assert_eq!(joins.try_recv(), Some(join("d")));
    }

    #[tokio::test]
    async fn test_close_ends_subscriptions() {
        let mut bus = EventBus::default();
        let mut joins = bus.on(EventKind::RemoteUserJoin);

        bus.emit(join("u1"));
        bus.close();

        assert_eq!(joins.recv().await, Some(join("u1")));
        assert_eq!(joins.recv().await, None);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
