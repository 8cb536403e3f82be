//! Content reports and their review.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::models::{Report, ReportStatus, ReportTargetType};
use crate::common::{DocumentId, ForumError, ForumResult, MemberId, ReportId, Viewer};
use crate::domains::content::{fetch_public_document, resolve_document};
use crate::domains::members::require_not_banned;
use crate::domains::moderation::{apply_moderation, ModerationAction, ModerationAuthority, ModerationResult};
use crate::domains::notifications::{dispatch, FanOutEvent};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReport {
    pub target_type: String,
    pub target_id: DocumentId,
    pub reason: String,
    #[serde(default)]
    pub detail: Option<String>,
}

pub async fn submit_report(
    deps: &ServerDeps,
    viewer: &Viewer,
    input: SubmitReport,
) -> ForumResult<Report> {
    let member_id = viewer.require_auth()?;
    let target_type = ReportTargetType::parse(&input.target_type)
        .map_err(|e| ForumError::bad_request(e.to_string()))?;
    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(ForumError::bad_request("reason is required"));
    }
    require_not_banned(member_id, deps).await?;

    let target = fetch_public_document(deps, &input.target_id).await?;
    if target.kind != target_type.document_kind() {
        return Err(ForumError::not_found(format!(
            "{} {}",
            target_type.as_str(),
            input.target_id
        )));
    }

    if deps
        .reports
        .find_pending_report(member_id, target_type, &input.target_id)
        .await?
        .is_some()
    {
        return Err(ForumError::bad_request(
            "you already have a pending report on this content",
        ));
    }

    let report = Report::new(
        target_type,
        input.target_id,
        member_id,
        reason,
        input.detail.filter(|d| !d.trim().is_empty()),
    );
    deps.reports.insert_report(&report).await?;

    info!(
        report_id = %report.id,
        target_id = %report.target_id,
        reported_by = %member_id,
        "report submitted"
    );
    Ok(report)
}

/// Admin listing, newest first. `status` is `pending` or `reviewed`.
pub async fn list_reports(
    deps: &ServerDeps,
    viewer: &Viewer,
    status: Option<&str>,
) -> ForumResult<Vec<Report>> {
    viewer.require_admin()?;
    let status = status
        .map(ReportStatus::parse)
        .transpose()
        .map_err(|e| ForumError::bad_request(e.to_string()))?;
    Ok(deps.reports.list_reports(status).await?)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub note: Option<String>,
    /// Moderation to apply to the reported content while reviewing.
    pub moderation: Option<ModerationAction>,
    /// Notify every admin about this report.
    #[serde(default)]
    pub escalate: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub report: Report,
    pub moderation: Option<ModerationResult>,
    /// The author's strike count after this review, when it could be updated.
    pub strike_count: Option<i32>,
}

/// Close a pending report.
///
/// Moderation (if requested) and the status change are authoritative; the
/// strike increment and notifications after them are best-effort.
pub async fn review_report(
    deps: &ServerDeps,
    viewer: &Viewer,
    id: ReportId,
    input: ReviewReport,
) -> ForumResult<ReviewOutcome> {
    let reviewer = viewer.require_admin()?;
    let report = deps
        .reports
        .find_report(id)
        .await?
        .ok_or_else(|| ForumError::not_found(format!("report {id}")))?;
    if !report.is_pending() {
        return Err(ForumError::bad_request("report has already been reviewed"));
    }

    let moderation = match input.moderation {
        Some(action) => Some(
            apply_moderation(
                deps,
                &report.target_id,
                action.target_status(),
                ModerationAuthority::ReportReview {
                    reviewer,
                    is_admin: viewer.is_admin,
                },
            )
            .await?,
        ),
        None => None,
    };

    let note = input.note.filter(|n| !n.trim().is_empty());
    let report = deps
        .reports
        .mark_reviewed(id, reviewer, note)
        .await?
        .ok_or_else(|| ForumError::bad_request("report has already been reviewed"))?;

    info!(
        report_id = %id,
        reviewer = %reviewer,
        moderation = input.moderation.map(|a| a.as_str()).unwrap_or("none"),
        escalate = input.escalate,
        "report reviewed"
    );

    let strike_count = match add_strike(deps, reviewer, &report.target_id).await {
        Ok(count) => count,
        Err(e) => {
            warn!(report_id = %id, error = %e, "strike increment failed");
            None
        }
    };

    if input.escalate {
        dispatch(
            deps,
            FanOutEvent::ReportEscalated {
                actor: reviewer,
                report: report.clone(),
            },
        )
        .await;
    }

    Ok(ReviewOutcome {
        report,
        moderation,
        strike_count,
    })
}

/// Add one strike to the author of `target` and alert admins on reaching
/// the threshold. Returns the new count, or `None` when the content has no
/// known author.
///
/// This is a read-then-write on `strike_count`. Two reviews of the same
/// author's content running at once can both read the same value and
/// under-count by one.
async fn add_strike(
    deps: &ServerDeps,
    reviewer: MemberId,
    target: &DocumentId,
) -> ForumResult<Option<i32>> {
    let Some(author_id) = resolve_document(deps, target).await?.author_id else {
        return Ok(None);
    };
    let Some(author) = deps.members.find_member(author_id).await? else {
        return Ok(None);
    };

    let strike_count = author.strike_count + 1;
    deps.members.set_strike_count(author_id, strike_count).await?;
    info!(member_id = %author_id, strike_count, "strike recorded");

    if strike_count == deps.strike_threshold {
        dispatch(
            deps,
            FanOutEvent::StrikeThresholdReached {
                actor: reviewer,
                member: author_id,
                strike_count,
            },
        )
        .await;
    }
    Ok(Some(strike_count))
}
