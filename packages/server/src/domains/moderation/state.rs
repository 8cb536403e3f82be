use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::MemberId;
use crate::domains::content::ModerationStatus;

/// A moderator's verb, as it appears in URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModerationAction {
    Approve,
    BlockComment,
    Hide,
}

impl ModerationAction {
    /// The status the document ends up in. Every status is reachable from
    /// every other one, so there is no "from" side to check.
    pub fn target_status(&self) -> Option<ModerationStatus> {
        match self {
            Self::Approve => None,
            Self::BlockComment => Some(ModerationStatus::BlockComment),
            Self::Hide => Some(ModerationStatus::Delete),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::BlockComment => "block-comment",
            Self::Hide => "hide",
        }
    }
}

impl FromStr for ModerationAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "block-comment" => Ok(Self::BlockComment),
            "hide" => Ok(Self::Hide),
            other => anyhow::bail!("unknown moderation action: {other}"),
        }
    }
}

/// Who is changing moderation, and through which path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAuthority {
    /// A category moderator acting directly. Needs an active grant on one of
    /// the document's categories.
    Moderator { member_id: MemberId, is_admin: bool },
    /// An admin acting while reviewing a report.
    ReportReview { reviewer: MemberId, is_admin: bool },
}

impl ModerationAuthority {
    pub fn actor(&self) -> MemberId {
        match self {
            Self::Moderator { member_id, .. } => *member_id,
            Self::ReportReview { reviewer, .. } => *reviewer,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Moderator { .. } => "moderator",
            Self::ReportReview { .. } => "report_review",
        }
    }
}

/// Search side effect of moving from `previous` to `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSync {
    Remove,
    Upsert,
    Nothing,
}

pub fn search_sync(
    previous: Option<ModerationStatus>,
    next: Option<ModerationStatus>,
    published: bool,
) -> SearchSync {
    let was_hidden = previous == Some(ModerationStatus::Delete);
    let now_hidden = next == Some(ModerationStatus::Delete);
    match (was_hidden, now_hidden) {
        (false, true) => SearchSync::Remove,
        (true, false) if published => SearchSync::Upsert,
        _ => SearchSync::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_maps_to_status() {
        assert_eq!(ModerationAction::Approve.target_status(), None);
        assert_eq!(
            ModerationAction::Hide.target_status(),
            Some(ModerationStatus::Delete)
        );
        assert_eq!(
            "block-comment".parse::<ModerationAction>().unwrap(),
            ModerationAction::BlockComment
        );
        assert!("delete".parse::<ModerationAction>().is_err());
    }

    #[test]
    fn test_search_sync_on_hide_and_unhide() {
        use ModerationStatus::*;

        assert_eq!(search_sync(None, Some(Delete), true), SearchSync::Remove);
        assert_eq!(search_sync(Some(BlockComment), Some(Delete), false), SearchSync::Remove);
        assert_eq!(search_sync(Some(Delete), None, true), SearchSync::Upsert);
        assert_eq!(search_sync(Some(Delete), Some(BlockComment), true), SearchSync::Upsert);
        assert_eq!(search_sync(Some(Delete), None, false), SearchSync::Nothing);
        assert_eq!(search_sync(None, Some(BlockComment), true), SearchSync::Nothing);
        assert_eq!(search_sync(Some(Delete), Some(Delete), true), SearchSync::Nothing);
    }
}
