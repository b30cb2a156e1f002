//! # Realtime Hub
//!
//! In-process publish-style broadcaster. Each room is a
//! `tokio::sync::broadcast` channel created on first subscription; a
//! publish fans the event out to the entity room and every participant's
//! personal room. Everything is best-effort: publishing to a room nobody
//! has joined is a no-op, and a lagging subscriber drops events rather
//! than slowing down the publisher.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

use gigbay_engine::Broadcast;
use gigbay_store::NotificationRecord;

/// Buffered events per room before a slow subscriber starts dropping.
const ROOM_CAPACITY: usize = 256;

/// One event as a subscriber receives it.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEvent {
    /// The transition name (e.g. `order.delivered`) or `notification`.
    pub event: String,
    /// The updated entity, serialized.
    pub entity: serde_json::Value,
    /// Transition-specific extra payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// Fan-out hub over per-room broadcast channels.
#[derive(Clone, Default)]
pub struct RealtimeHub {
    rooms: Arc<RwLock<HashMap<String, broadcast::Sender<RealtimeEvent>>>>,
}

impl RealtimeHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a room, creating it if needed.
    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<RealtimeEvent> {
        let mut rooms = self.rooms.write();
        rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Publish a transition broadcast to its entity room and every
    /// participant's personal room.
    pub fn publish(&self, broadcast: &Broadcast) {
        let event = RealtimeEvent {
            event: broadcast.event.to_string(),
            entity: broadcast.entity.clone(),
            extra: broadcast.extra.clone(),
        };
        let mut targets = vec![broadcast.channel.clone()];
        targets.extend(broadcast.participants.iter().map(|u| u.to_string()));
        self.send_to(&targets, event);
    }

    /// Push a freshly persisted notification to its recipient's room.
    pub fn publish_notification(&self, record: &NotificationRecord) {
        let event = RealtimeEvent {
            event: "notification".to_string(),
            entity: serde_json::to_value(record).unwrap_or(serde_json::Value::Null),
            extra: None,
        };
        self.send_to(&[record.recipient.to_string()], event);
    }

    fn send_to(&self, targets: &[String], event: RealtimeEvent) {
        let rooms = self.rooms.read();
        for target in targets {
            if let Some(sender) = rooms.get(target) {
                // A send error means the room has no live subscribers.
                let _ = sender.send(event.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gigbay_core::UserId;
    use gigbay_engine::NotificationCategory;

    #[tokio::test]
    async fn events_reach_entity_and_participant_rooms() {
        let hub = RealtimeHub::new();
        let user = UserId::new();
        let mut entity_rx = hub.subscribe("order:abc");
        let mut user_rx = hub.subscribe(&user.to_string());

        hub.publish(&Broadcast {
            event: "order.delivered",
            channel: "order:abc".into(),
            participants: vec![user],
            entity: serde_json::json!({"id": "abc"}),
            extra: None,
        });

        assert_eq!(entity_rx.recv().await.unwrap().event, "order.delivered");
        assert_eq!(user_rx.recv().await.unwrap().event, "order.delivered");
    }

    #[tokio::test]
    async fn publishing_to_an_empty_room_is_a_no_op() {
        let hub = RealtimeHub::new();
        hub.publish(&Broadcast {
            event: "order.created",
            channel: "order:nobody-listening".into(),
            participants: vec![UserId::new()],
            entity: serde_json::Value::Null,
            extra: None,
        });
    }

    #[tokio::test]
    async fn notifications_land_in_the_recipients_room() {
        let hub = RealtimeHub::new();
        let recipient = UserId::new();
        let mut rx = hub.subscribe(&recipient.to_string());

        hub.publish_notification(&NotificationRecord {
            id: uuid::Uuid::new_v4(),
            recipient,
            title: "Delivery submitted".into(),
            body: "…".into(),
            category: NotificationCategory::DeliverySubmitted,
            payload: serde_json::json!({}),
            read: false,
            created_at: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, "notification");
        assert_eq!(event.entity["title"], "Delivery submitted");
    }
}
