use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::{DocumentId, MemberId, ReportId};
use crate::domains::content::DocumentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTargetType {
    Post,
    Comment,
}

impl ReportTargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "post" => Ok(Self::Post),
            "comment" => Ok(Self::Comment),
            other => anyhow::bail!("unknown report target: {other}"),
        }
    }

    pub fn document_kind(&self) -> DocumentKind {
        match self {
            Self::Post => DocumentKind::Post,
            Self::Comment => DocumentKind::Comment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Reviewed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            other => anyhow::bail!("unknown report status: {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub target_type: ReportTargetType,
    pub target_id: DocumentId,
    pub reported_by: MemberId,
    pub reason: String,
    pub detail: Option<String>,
    pub status: ReportStatus,
    pub reviewed_by: Option<MemberId>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn new(
        target_type: ReportTargetType,
        target_id: DocumentId,
        reported_by: MemberId,
        reason: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            id: ReportId::new(),
            target_type,
            target_id,
            reported_by,
            reason: reason.into(),
            detail,
            status: ReportStatus::Pending,
            reviewed_by: None,
            review_note: None,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }
}

#[derive(FromRow)]
struct ReportRow {
    id: ReportId,
    target_type: String,
    target_id: DocumentId,
    reported_by: MemberId,
    reason: String,
    detail: Option<String>,
    status: String,
    reviewed_by: Option<MemberId>,
    review_note: Option<String>,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReportRow> for Report {
    type Error = anyhow::Error;

    fn try_from(row: ReportRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            target_type: ReportTargetType::parse(&row.target_type)?,
            target_id: row.target_id,
            reported_by: row.reported_by,
            reason: row.reason,
            detail: row.detail,
            status: ReportStatus::parse(&row.status)?,
            reviewed_by: row.reviewed_by,
            review_note: row.review_note,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
        })
    }
}

impl Report {
    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO reports
                (id, target_type, target_id, reported_by, reason, detail, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(self.id)
        .bind(self.target_type.as_str())
        .bind(self.target_id.as_str())
        .bind(self.reported_by)
        .bind(&self.reason)
        .bind(&self.detail)
        .bind(self.status.as_str())
        .bind(self.created_at)
        .execute(pool)
        .await
        .context("Failed to insert report")?;
        Ok(())
    }

    pub async fn find_by_id(id: ReportId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Self::try_from)
            .transpose()
    }

    pub async fn find_pending_by_reporter(
        reported_by: MemberId,
        target_type: ReportTargetType,
        target_id: &DocumentId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, ReportRow>(
            "SELECT * FROM reports
             WHERE reported_by = $1 AND target_type = $2 AND target_id = $3 AND status = 'pending'
             LIMIT 1",
        )
        .bind(reported_by)
        .bind(target_type.as_str())
        .bind(target_id.as_str())
        .fetch_optional(pool)
        .await?
        .map(Self::try_from)
        .transpose()
    }

    pub async fn find_all(status: Option<ReportStatus>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, ReportRow>(
            "SELECT * FROM reports
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Self::try_from)
        .collect()
    }

    /// Flip a pending report to reviewed. Returns `None` when the report was
    /// not pending.
    pub async fn mark_reviewed(
        id: ReportId,
        reviewed_by: MemberId,
        review_note: Option<String>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, ReportRow>(
            "UPDATE reports
             SET status = 'reviewed', reviewed_by = $2, review_note = $3, reviewed_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING *",
        )
        .bind(id)
        .bind(reviewed_by)
        .bind(review_note)
        .fetch_optional(pool)
        .await?
        .map(Self::try_from)
        .transpose()
    }
}
