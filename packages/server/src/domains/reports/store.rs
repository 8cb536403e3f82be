use anyhow::Result;
use async_trait::async_trait;

use super::models::{Report, ReportStatus, ReportTargetType};
use crate::common::{DocumentId, MemberId, ReportId};

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert_report(&self, report: &Report) -> Result<()>;

    async fn find_report(&self, id: ReportId) -> Result<Option<Report>>;

    /// The reporter's pending report on a target, if any.
    async fn find_pending_report(
        &self,
        reported_by: MemberId,
        target_type: ReportTargetType,
        target_id: &DocumentId,
    ) -> Result<Option<Report>>;

    /// Newest first.
    async fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>>;

    /// Returns `None` unless the report was pending.
    async fn mark_reviewed(
        &self,
        id: ReportId,
        reviewed_by: MemberId,
        review_note: Option<String>,
    ) -> Result<Option<Report>>;
}
