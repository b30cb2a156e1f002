//! # Effect Dispatcher
//!
//! The single loop that executes the effect descriptions transitions
//! return. Runs strictly after the transactional write commits, off the
//! caller's critical path, and swallows every failure into a log line —
//! a transition's success is defined by the state-machine write alone.
//!
//! If the process dies between the commit and the dispatch, the state
//! change is durable but the effects for that transition are lost:
//! at-most-once for effects, exactly-once for state. A durable outbox
//! written in the state transaction would tighten this if notification
//! delivery ever becomes a hard requirement.

use std::sync::Arc;

use chrono::Utc;

use gigbay_engine::Effect;
use gigbay_store::{EngagementStore, NotificationRecord};

use crate::realtime::RealtimeHub;

/// Executes notification and broadcast effects.
#[derive(Clone)]
pub struct EffectDispatcher {
    store: Arc<dyn EngagementStore>,
    realtime: RealtimeHub,
}

impl EffectDispatcher {
    pub fn new(store: Arc<dyn EngagementStore>, realtime: RealtimeHub) -> Self {
        Self { store, realtime }
    }

    /// Fire-and-forget: execute the effects on a background task.
    pub fn dispatch(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run(effects).await;
        });
    }

    /// Execute effects inline. Used by the background sweep and by tests
    /// that need deterministic completion.
    pub async fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(notify) => {
                    let record = NotificationRecord::from_effect(&notify, Utc::now());
                    match self.store.insert_notification(&record).await {
                        Ok(()) => self.realtime.publish_notification(&record),
                        Err(error) => {
                            tracing::warn!(
                                recipient = %notify.recipient,
                                %error,
                                "failed to persist notification; dropping"
                            );
                        }
                    }
                }
                Effect::Broadcast(broadcast) => {
                    self.realtime.publish(&broadcast);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigbay_core::UserId;
    use gigbay_engine::effects::{Broadcast, NotificationCategory, Notify};
    use gigbay_store::MemoryStore;

    #[tokio::test]
    async fn notifications_are_persisted_and_pushed() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let recipient = UserId::new();
        let mut rx = hub.subscribe(&recipient.to_string());
        let dispatcher = EffectDispatcher::new(store.clone(), hub);

        dispatcher
            .run(vec![Effect::Notify(Notify {
                recipient,
                title: "Offer accepted".into(),
                body: "…".into(),
                category: NotificationCategory::OfferAccepted,
                payload: serde_json::json!({}),
            })])
            .await;

        let stored = store.notifications_for_user(recipient).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].read);
        assert_eq!(rx.recv().await.unwrap().event, "notification");
    }

    #[tokio::test]
    async fn broadcasts_reach_the_entity_room() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe("order:xyz");
        let dispatcher = EffectDispatcher::new(store, hub);

        dispatcher
            .run(vec![Effect::Broadcast(Broadcast {
                event: "order.completed",
                channel: "order:xyz".into(),
                participants: vec![],
                entity: serde_json::Value::Null,
                extra: None,
            })])
            .await;

        assert_eq!(rx.recv().await.unwrap().event, "order.completed");
    }
}
