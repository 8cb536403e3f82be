use anyhow::Result;
use async_trait::async_trait;

use super::models::Notification;
use crate::common::{MemberId, NotificationId};

/// Persistence for notifications. Rows are the durable record of delivery.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> Result<()>;

    /// Newest first.
    async fn list_notifications(
        &self,
        recipient: MemberId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>>;

    /// `None` when the notification does not exist or belongs to someone else.
    async fn mark_notification_read(
        &self,
        id: NotificationId,
        recipient: MemberId,
    ) -> Result<Option<Notification>>;

    async fn unread_count(&self, recipient: MemberId) -> Result<i64>;
}
