use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Member,
    Admin,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            other => anyhow::bail!("unknown member role: {other}"),
        }
    }
}

/// A forum member, including ban and strike bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    pub role: MemberRole,
    pub banned: bool,
    /// `None` with `banned = true` is a permanent ban.
    pub banned_until: Option<DateTime<Utc>>,
    pub ban_reason: Option<String>,
    pub strike_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(display_name: impl Into<String>, role: MemberRole) -> Self {
        Self {
            id: MemberId::new(),
            display_name: display_name.into(),
            role,
            banned: false,
            banned_until: None,
            ban_reason: None,
            strike_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

#[derive(FromRow)]
struct MemberRow {
    id: MemberId,
    display_name: String,
    role: String,
    banned: bool,
    banned_until: Option<DateTime<Utc>>,
    ban_reason: Option<String>,
    strike_count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = anyhow::Error;

    fn try_from(row: MemberRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            display_name: row.display_name,
            role: MemberRole::parse(&row.role)?,
            banned: row.banned,
            banned_until: row.banned_until,
            ban_reason: row.ban_reason,
            strike_count: row.strike_count,
            created_at: row.created_at,
        })
    }
}

impl Member {
    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO members (id, display_name, role, banned, banned_until, ban_reason, strike_count, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(self.id)
        .bind(&self.display_name)
        .bind(self.role.as_str())
        .bind(self.banned)
        .bind(self.banned_until)
        .bind(&self.ban_reason)
        .bind(self.strike_count)
        .bind(self.created_at)
        .execute(pool)
        .await
        .context("Failed to insert member")?;
        Ok(())
    }

    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Self::try_from)
            .transpose()
    }

    pub async fn find_by_ids(ids: &[MemberId], pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Self::try_from)
            .collect()
    }

    pub async fn find_admin_ids(pool: &PgPool) -> Result<Vec<MemberId>> {
        sqlx::query_scalar::<_, MemberId>(
            "SELECT id FROM members WHERE role = 'admin' ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn clear_ban(id: MemberId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "UPDATE members SET banned = FALSE, banned_until = NULL, ban_reason = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to clear ban")?;
        Ok(())
    }

    pub async fn update_strike_count(id: MemberId, strike_count: i32, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE members SET strike_count = $2 WHERE id = $1")
            .bind(id)
            .bind(strike_count)
            .execute(pool)
            .await
            .context("Failed to update strike count")?;
        Ok(())
    }
}
