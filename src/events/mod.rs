//! Order event broadcasting.
//!
//! A single process-scoped [`EventBroadcaster`] carries the "orders" topic: it
//! is created at startup, injected into the order service (publish side) and
//! the websocket gateway (subscribe side), and torn down with the process.
//! Delivery is fire-and-forget: no acknowledgment, no retry, no replay for
//! subscribers that connect after an event was published.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use utoipa::ToSchema;

use crate::repositories::order_repository::OrderSnapshot;

/// An order lifecycle event carrying the fully resolved order snapshot, so
/// subscribers never need a follow-up read.
///
/// Serializes to the push-channel wire shape
/// `{"type": "order_created" | "order_updated", "order": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "order", rename_all = "snake_case")]
pub enum Event {
    OrderCreated(OrderSnapshot),
    OrderUpdated(OrderSnapshot),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::OrderCreated(_) => "order_created",
            Event::OrderUpdated(_) => "order_updated",
        }
    }

    pub fn order(&self) -> &OrderSnapshot {
        match self {
            Event::OrderCreated(snapshot) | Event::OrderUpdated(snapshot) => snapshot,
        }
    }
}

/// Fan-out hub for the shared "orders" topic.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<Event>,
}

impl EventBroadcaster {
    /// Creates a broadcaster whose subscribers may lag up to `capacity`
    /// undelivered events before older ones are dropped.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a new subscriber. The receiver observes only events published
    /// after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publishes an event to every current subscriber.
    ///
    /// Having no subscribers is not an error; the event is simply dropped.
    /// Returns the number of subscribers the event was handed to.
    pub fn publish(&self, event: Event) -> usize {
        let kind = event.kind();
        let order_id = event.order().id;
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(event = kind, order_id, receivers, "Broadcast order event");
                receivers
            }
            Err(_) => {
                debug!(event = kind, order_id, "No subscribers for order event");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn snapshot(id: i64) -> OrderSnapshot {
        OrderSnapshot {
            id,
            table_id: 1,
            table_number: 4,
            waiter_id: 9,
            waiter_name: "Ana".into(),
            status: crate::entities::order::OrderStatus::Pending,
            total_amount: dec!(17.00),
            notes: None,
            items: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_event() {
        let hub = EventBroadcaster::new(16);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        let delivered = hub.publish(Event::OrderCreated(snapshot(1)));
        assert_eq!(delivered, 2);

        assert_eq!(first.recv().await.unwrap().order().id, 1);
        assert_eq!(second.recv().await.unwrap().order().id, 1);
    }

    #[tokio::test]
    async fn late_subscribers_do_not_see_earlier_events() {
        let hub = EventBroadcaster::new(16);
        let mut early = hub.subscribe();

        hub.publish(Event::OrderCreated(snapshot(1)));

        let mut late = hub.subscribe();
        hub.publish(Event::OrderUpdated(snapshot(2)));

        assert_eq!(early.recv().await.unwrap().kind(), "order_created");
        assert_eq!(early.recv().await.unwrap().kind(), "order_updated");

        // The late subscriber only observes the second event.
        let only = late.recv().await.unwrap();
        assert_eq!(only.kind(), "order_updated");
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_not_an_error() {
        let hub = EventBroadcaster::new(16);
        assert_eq!(hub.publish(Event::OrderCreated(snapshot(1))), 0);
    }

    #[test]
    fn event_serializes_to_push_channel_wire_shape() {
        let event = Event::OrderUpdated(snapshot(42));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "order_updated");
        assert_eq!(value["order"]["id"], 42);
        assert_eq!(value["order"]["status"], "pending");
        assert_eq!(value["order"]["total_amount"], "17.00");
    }
}
