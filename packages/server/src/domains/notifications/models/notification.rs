use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::{MemberId, NotificationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Comment,
    Like,
    Upvote,
    Follow,
    Report,
    StrikeThreshold,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Like => "like",
            Self::Upvote => "upvote",
            Self::Follow => "follow",
            Self::Report => "report",
            Self::StrikeThreshold => "strike_threshold",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "comment" => Ok(Self::Comment),
            "like" => Ok(Self::Like),
            "upvote" => Ok(Self::Upvote),
            "follow" => Ok(Self::Follow),
            "report" => Ok(Self::Report),
            "strike_threshold" => Ok(Self::StrikeThreshold),
            other => anyhow::bail!("unknown notification type: {other}"),
        }
    }
}

/// One notification for one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: MemberId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    pub data: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: MemberId,
        kind: NotificationType,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id,
            kind,
            message: message.into(),
            data,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(FromRow)]
struct NotificationRow {
    id: NotificationId,
    recipient_id: MemberId,
    kind: String,
    message: String,
    data: serde_json::Value,
    read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = anyhow::Error;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            recipient_id: row.recipient_id,
            kind: NotificationType::parse(&row.kind)?,
            message: row.message,
            data: row.data,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

impl Notification {
    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO notifications (id, recipient_id, kind, message, data, read, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(self.id)
        .bind(self.recipient_id)
        .bind(self.kind.as_str())
        .bind(&self.message)
        .bind(&self.data)
        .bind(self.read)
        .bind(self.created_at)
        .execute(pool)
        .await
        .context("Failed to insert notification")?;
        Ok(())
    }

    pub async fn find_for_recipient(
        recipient_id: MemberId,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications WHERE recipient_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Self::try_from)
        .collect()
    }

    /// Marks read only when `recipient_id` owns the row.
    pub async fn mark_read(
        id: NotificationId,
        recipient_id: MemberId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, NotificationRow>(
            "UPDATE notifications SET read = TRUE
             WHERE id = $1 AND recipient_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(pool)
        .await?
        .map(Self::try_from)
        .transpose()
    }

    pub async fn count_unread(recipient_id: MemberId, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND NOT read",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_kind_as_type() {
        let n = Notification::new(
            MemberId::new(),
            NotificationType::StrikeThreshold,
            "x",
            serde_json::json!({}),
        );
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["type"], "strike_threshold");
        assert_eq!(value["read"], false);
    }
}
