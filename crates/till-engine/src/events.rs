//! # Notification Bus
//!
//! Fans committed events out to in-process subscribers (receipt printers,
//! dashboards, sync agents) over a tokio broadcast channel.
//!
//! Delivery is fire-and-forget. Publishing with no subscribers is normal
//! (the bus simply drops the event), and a slow subscriber lags rather
//! than blocking the till. Events that must not be lost are queued in the
//! database outbox inside the committing transaction and flow through
//! [`EventBus::drain_outbox`] afterwards.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use till_core::PosEvent;
use till_db::Database;

use crate::error::EngineResult;

const DEFAULT_CAPACITY: usize = 64;

/// In-process publish/subscribe hub for [`PosEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PosEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Capacity is the per-subscriber backlog; a subscriber that falls
    /// further behind sees `RecvError::Lagged` and skips ahead.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        EventBus { sender }
    }

    /// Subscribes to all events published from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<PosEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to current subscribers. Never fails: with no
    /// subscribers the event is dropped.
    pub fn publish(&self, event: PosEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event_type, receivers, "event published"),
            Err(_) => debug!(event_type, "event dropped, no subscribers"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes every pending outbox event and marks it published.
    /// Returns the number of events broadcast.
    ///
    /// Safe to call after every commit and from a periodic sweep; events
    /// left behind by a crash between commit and drain go out on the next
    /// call. An undecodable payload is logged and retired so it cannot
    /// wedge the queue.
    pub async fn drain_outbox(&self, db: &Database) -> EngineResult<usize> {
        let outbox = db.outbox();
        let pending = outbox.pending(100).await?;
        let mut published = 0;

        for row in pending {
            match serde_json::from_str::<PosEvent>(&row.payload) {
                Ok(event) => {
                    self.publish(event);
                    published += 1;
                }
                Err(e) => {
                    warn!(event_id = %row.id, error = %e, "discarding undecodable outbox event");
                }
            }
            outbox.mark_published(&row.id).await?;
        }

        if published > 0 {
            debug!(published, "outbox drained");
        }
        Ok(published)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PosEvent::InventoryUpdated {
            product_id: "p1".to_string(),
            new_quantity: 3,
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "inventory_updated");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(PosEvent::InventoryUpdated {
            product_id: "p1".to_string(),
            new_quantity: 3,
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
