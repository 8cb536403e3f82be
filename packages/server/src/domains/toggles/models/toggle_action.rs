use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::{MemberId, ToggleActionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Like,
    Follow,
    Upvote,
    Downvote,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [Self::Like, Self::Follow, Self::Upvote, Self::Downvote];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Follow => "follow",
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "like" => Ok(Self::Like),
            "follow" => Ok(Self::Follow),
            "upvote" => Ok(Self::Upvote),
            "downvote" => Ok(Self::Downvote),
            other => anyhow::bail!("unknown action type: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Post,
    Trade,
    Comment,
    Category,
    User,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Trade => "trade",
            Self::Comment => "comment",
            Self::Category => "category",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "post" => Ok(Self::Post),
            "trade" => Ok(Self::Trade),
            "comment" => Ok(Self::Comment),
            "category" => Ok(Self::Category),
            "user" => Ok(Self::User),
            other => anyhow::bail!("unknown target type: {other}"),
        }
    }

    /// Action types that may be toggled on this kind of target.
    pub fn allowed_actions(&self) -> &'static [ActionType] {
        match self {
            Self::Post | Self::Trade => &ActionType::ALL,
            Self::Comment => &[ActionType::Like],
            Self::Category | Self::User => &[ActionType::Follow],
        }
    }

    pub fn allows(&self, action: ActionType) -> bool {
        self.allowed_actions().contains(&action)
    }
}

/// Composite identity of a ledger row. At most one row exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToggleKey {
    pub user_id: MemberId,
    pub target_type: TargetType,
    pub target_id: String,
    pub action_type: ActionType,
}

/// Presence of this row means the action is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAction {
    pub id: ToggleActionId,
    pub user_id: MemberId,
    pub target_type: TargetType,
    pub target_id: String,
    pub action_type: ActionType,
    pub created_at: DateTime<Utc>,
}

impl ToggleAction {
    pub fn new(key: &ToggleKey) -> Self {
        Self {
            id: ToggleActionId::new(),
            user_id: key.user_id,
            target_type: key.target_type,
            target_id: key.target_id.clone(),
            action_type: key.action_type,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> ToggleKey {
        ToggleKey {
            user_id: self.user_id,
            target_type: self.target_type,
            target_id: self.target_id.clone(),
            action_type: self.action_type,
        }
    }
}

#[derive(FromRow)]
struct ToggleRow {
    id: ToggleActionId,
    user_id: MemberId,
    target_type: String,
    target_id: String,
    action_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ToggleRow> for ToggleAction {
    type Error = anyhow::Error;

    fn try_from(row: ToggleRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            target_type: TargetType::parse(&row.target_type)?,
            target_id: row.target_id,
            action_type: ActionType::parse(&row.action_type)?,
            created_at: row.created_at,
        })
    }
}

impl ToggleAction {
    pub async fn find_by_key(key: &ToggleKey, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, ToggleRow>(
            "SELECT * FROM toggle_actions
             WHERE user_id = $1 AND target_type = $2 AND target_id = $3 AND action_type = $4",
        )
        .bind(key.user_id)
        .bind(key.target_type.as_str())
        .bind(&key.target_id)
        .bind(key.action_type.as_str())
        .fetch_optional(pool)
        .await?
        .map(Self::try_from)
        .transpose()
    }

    /// Insert unless a row with the same key exists. Returns `false` when the
    /// unique constraint rejected the row.
    pub async fn insert_if_absent(&self, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO toggle_actions (id, user_id, target_type, target_id, action_type, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, target_type, target_id, action_type) DO NOTHING",
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.target_type.as_str())
        .bind(&self.target_id)
        .bind(self.action_type.as_str())
        .bind(self.created_at)
        .execute(pool)
        .await
        .context("Failed to insert toggle action")?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_by_id(id: ToggleActionId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM toggle_actions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to delete toggle action")?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn count_for_target(
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
        pool: &PgPool,
    ) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM toggle_actions
             WHERE target_type = $1 AND target_id = $2 AND action_type = $3",
        )
        .bind(target_type.as_str())
        .bind(target_id)
        .bind(action_type.as_str())
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Members holding `action_type` on the target, oldest first.
    pub async fn find_user_ids(
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
        pool: &PgPool,
    ) -> Result<Vec<MemberId>> {
        sqlx::query_scalar::<_, MemberId>(
            "SELECT user_id FROM toggle_actions
             WHERE target_type = $1 AND target_id = $2 AND action_type = $3
             ORDER BY created_at",
        )
        .bind(target_type.as_str())
        .bind(target_id)
        .bind(action_type.as_str())
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_for_user_on_target(
        user_id: MemberId,
        target_type: TargetType,
        target_id: &str,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, ToggleRow>(
            "SELECT * FROM toggle_actions
             WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
        )
        .bind(user_id)
        .bind(target_type.as_str())
        .bind(target_id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Self::try_from)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_actions_per_target() {
        assert!(TargetType::Post.allows(ActionType::Downvote));
        assert!(TargetType::Trade.allows(ActionType::Follow));
        assert!(TargetType::Comment.allows(ActionType::Like));
        assert!(!TargetType::Comment.allows(ActionType::Upvote));
        assert!(TargetType::Category.allows(ActionType::Follow));
        assert!(!TargetType::Category.allows(ActionType::Like));
        assert!(!TargetType::User.allows(ActionType::Upvote));
    }

    #[test]
    fn test_key_roundtrips_through_row() {
        let key = ToggleKey {
            user_id: MemberId::new(),
            target_type: TargetType::Post,
            target_id: "abc".into(),
            action_type: ActionType::Like,
        };
        assert_eq!(ToggleAction::new(&key).key(), key);
    }
}
