use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::{CategoryId, GrantId, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    Pending,
    Active,
    Removed,
}

impl GrantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Removed => "removed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "removed" => Ok(Self::Removed),
            other => anyhow::bail!("unknown grant status: {other}"),
        }
    }
}

/// One row of a member's moderator history for a category.
///
/// Rows are append-only; the most recently created row per
/// `(category_id, user_id)` is the authoritative one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorGrant {
    pub id: GrantId,
    pub category_id: CategoryId,
    pub user_id: MemberId,
    pub status: GrantStatus,
    pub created_at: DateTime<Utc>,
}

impl ModeratorGrant {
    pub fn new(category_id: CategoryId, user_id: MemberId, status: GrantStatus) -> Self {
        Self {
            id: GrantId::new(),
            category_id,
            user_id,
            status,
            created_at: Utc::now(),
        }
    }
}

/// Keep only the latest grant per category.
pub fn latest_per_category(grants: impl IntoIterator<Item = ModeratorGrant>) -> Vec<ModeratorGrant> {
    let mut latest: Vec<ModeratorGrant> = Vec::new();
    for grant in grants {
        match latest.iter_mut().find(|g| g.category_id == grant.category_id) {
            Some(existing) => {
                if (grant.created_at, grant.id) > (existing.created_at, existing.id) {
                    *existing = grant;
                }
            }
            None => latest.push(grant),
        }
    }
    latest
}

#[derive(FromRow)]
struct GrantRow {
    id: GrantId,
    category_id: CategoryId,
    user_id: MemberId,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<GrantRow> for ModeratorGrant {
    type Error = anyhow::Error;

    fn try_from(row: GrantRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            category_id: row.category_id,
            user_id: row.user_id,
            status: GrantStatus::parse(&row.status)?,
            created_at: row.created_at,
        })
    }
}

impl ModeratorGrant {
    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO category_moderator_grants (id, category_id, user_id, status, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(self.id)
        .bind(self.category_id)
        .bind(self.user_id)
        .bind(self.status.as_str())
        .bind(self.created_at)
        .execute(pool)
        .await
        .context("Failed to insert moderator grant")?;
        Ok(())
    }

    pub async fn find_latest_for_member(
        user_id: MemberId,
        categories: &[CategoryId],
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, GrantRow>(
            "SELECT DISTINCT ON (category_id) *
             FROM category_moderator_grants
             WHERE user_id = $1 AND category_id = ANY($2)
             ORDER BY category_id, created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(categories.to_vec())
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
    use chrono::Duration;

    #[test]
    fn test_latest_grant_wins_regardless_of_order() {
        let category = CategoryId::new();
        let member = MemberId::new();

        let mut old_active = ModeratorGrant::new(category, member, GrantStatus::Active);
        old_active.created_at = Utc::now() - Duration::days(10);
        let removed = ModeratorGrant::new(category, member, GrantStatus::Removed);

        let latest = latest_per_category(vec![removed.clone(), old_active]);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].status, GrantStatus::Removed);
    }
}
