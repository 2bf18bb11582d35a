use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::domain::events::ContactListEvent;
use crate::domain::ports::EventPublisher;

/// Typed fan-out of view-model events over `tokio::sync::broadcast`.
///
/// The channel is bounded; slow subscribers lose the oldest events and are
/// expected to re-read the view model.
#[derive(Clone)]
pub struct EventBroadcaster<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> EventBroadcaster<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Errors (no active subscribers) are ignored.
    pub fn send(&self, value: T) {
        let _ = self.tx.send(value);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Stream of events sent after this call; lag errors are filtered out.
    pub fn subscribe_stream(&self) -> impl Stream<Item = T> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|res| async move { res.ok() })
    }
}

/// Adapter: implements the domain port and forwards into the broadcaster.
pub struct BroadcastEventPublisher {
    out: EventBroadcaster<ContactListEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(out: EventBroadcaster<ContactListEvent>) -> Self {
        Self { out }
    }
}

impl EventPublisher<ContactListEvent> for BroadcastEventPublisher {
    fn publish(&self, event: &ContactListEvent) {
        self.out.send(event.clone());
    }
}
