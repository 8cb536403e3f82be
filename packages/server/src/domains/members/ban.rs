//! Ban gate run before any content-creating mutation.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::models::Member;
use super::store::MemberStore;
use crate::common::{ForumError, ForumResult, MemberId};
use crate::kernel::ServerDeps;

/// Outcome of evaluating a member's ban.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BanStatus {
    NotBanned,
    /// The ban had run out and was cleared by this check.
    Expired,
    Active {
        until: Option<DateTime<Utc>>,
        reason: Option<String>,
    },
}

impl BanStatus {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Human-readable explanation for a blocked member.
    pub fn message(&self, now: DateTime<Utc>) -> Option<String> {
        let Self::Active { until, reason } = self else {
            return None;
        };

        let mut message = match until {
            Some(until) => format!(
                "You are banned for another {}",
                format_remaining(*until - now)
            ),
            None => "You are permanently banned".to_string(),
        };
        if let Some(reason) = reason.as_deref().filter(|r| !r.is_empty()) {
            message.push_str(&format!(" (reason: {reason})"));
        }
        Some(message)
    }
}

/// Evaluate `member`'s ban at `now`, clearing it in the store when it has
/// expired.
pub async fn check_ban(
    member: &Member,
    now: DateTime<Utc>,
    store: &dyn MemberStore,
) -> Result<BanStatus> {
    if !member.banned {
        return Ok(BanStatus::NotBanned);
    }

    match member.banned_until {
        Some(until) if until <= now => {
            store.clear_ban(member.id).await?;
            info!(member_id = %member.id, "expired ban cleared");
            Ok(BanStatus::Expired)
        }
        until => Ok(BanStatus::Active {
            until,
            reason: member.ban_reason.clone(),
        }),
    }
}

/// Load the acting member and reject them if banned.
pub async fn require_not_banned(member_id: MemberId, deps: &ServerDeps) -> ForumResult<Member> {
    let mut member = deps
        .members
        .find_member(member_id)
        .await?
        .ok_or(ForumError::Unauthenticated)?;

    let now = Utc::now();
    let status = check_ban(&member, now, deps.members.as_ref()).await?;
    if let Some(message) = status.message(now) {
        return Err(ForumError::Forbidden(message));
    }
    if status == BanStatus::Expired {
        member.banned = false;
        member.banned_until = None;
        member.ban_reason = None;
    }
    Ok(member)
}

fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes();
    if minutes < 1 {
        return "less than a minute".to_string();
    }

    let days = minutes / (60 * 24);
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if days == 0 && mins > 0 {
        parts.push(plural(mins, "minute"));
    }
    parts.join(", ")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
