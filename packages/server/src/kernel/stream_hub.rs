//! In-process pub/sub hub for real-time streaming.
//!
//! Provides topic-keyed broadcast channels for pushing events to SSE endpoints.
//! Topics are opaque strings; notification delivery uses `notifications:{member_id}`.
//!
//! Producers:
//!   hub.publish("notifications:abc-123", json!({"type": "notification", ...})).await;
//!
//! Consumers (SSE endpoints):
//!   let rx = hub.subscribe("notifications:abc-123").await;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::traits::BaseRealtimeChannel;
use crate::common::MemberId;

/// Topic carrying a member's notifications.
pub fn notification_topic(member_id: MemberId) -> String {
    format!("notifications:{member_id}")
}

/// Thread-safe, cloneable. Keyed by string topics.
/// Payloads are `serde_json::Value`; domains serialize their own types.
#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    /// Default capacity is 256 messages per channel.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish a JSON value to a topic. Returns the number of receivers
    /// reached; zero when nobody is subscribed.
    pub async fn publish(&self, topic: &str, value: serde_json::Value) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(topic)
            .and_then(|tx| tx.send(value).ok())
            .unwrap_or(0)
    }

    /// Subscribe to a topic. Creates the channel if it doesn't exist.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    pub async fn topic_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Remove channels with zero subscribers.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRealtimeChannel for StreamHub {
    async fn push_to_user(
        &self,
        member_id: MemberId,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let message = serde_json::json!({ "type": event, "data": payload });
        self.publish(&notification_topic(member_id), message).await;
        Ok(())
    }
}
