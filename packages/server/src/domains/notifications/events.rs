//! Events that trigger notification fan-out, and their message templates.

use std::collections::HashMap;

use serde_json::json;

use super::models::NotificationType;
use crate::common::MemberId;
use crate::domains::content::Document;
use crate::domains::reports::Report;
use crate::domains::toggles::ActionType;

/// Something happened that other members may need to hear about.
///
/// Events carry the documents they refer to so recipient resolution does
/// not have to re-read them.
#[derive(Debug, Clone)]
pub enum FanOutEvent {
    /// A top-level comment on a post or trade.
    CommentCreated {
        actor: MemberId,
        comment: Document,
        target: Document,
    },
    /// A reply to an existing comment.
    ReplyCreated {
        actor: MemberId,
        reply: Document,
        parent: Document,
        target: Document,
    },
    /// An activating like/upvote/follow on a post or trade.
    ContentToggled {
        actor: MemberId,
        action: ActionType,
        content: Document,
    },
    MemberFollowed {
        actor: MemberId,
        followed: MemberId,
    },
    /// First publish of a post or trade.
    DocumentPublished {
        actor: MemberId,
        document: Document,
    },
    ReportEscalated {
        actor: MemberId,
        report: Report,
    },
    StrikeThresholdReached {
        actor: MemberId,
        member: MemberId,
        strike_count: i32,
    },
}

/// Message and payload shared by every recipient of one event.
#[derive(Debug, Clone)]
pub struct RenderedNotification {
    pub kind: NotificationType,
    pub message: String,
    pub data: serde_json::Value,
}

/// Display names resolved once per event.
#[derive(Debug, Default)]
pub struct DisplayNames(HashMap<MemberId, String>);

impl DisplayNames {
    pub fn new(names: impl IntoIterator<Item = (MemberId, String)>) -> Self {
        Self(names.into_iter().collect())
    }

    pub fn get(&self, id: MemberId) -> &str {
        self.0.get(&id).map(String::as_str).unwrap_or("Someone")
    }
}

impl FanOutEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CommentCreated { .. } => "comment_created",
            Self::ReplyCreated { .. } => "reply_created",
            Self::ContentToggled { .. } => "content_toggled",
            Self::MemberFollowed { .. } => "member_followed",
            Self::DocumentPublished { .. } => "document_published",
            Self::ReportEscalated { .. } => "report_escalated",
            Self::StrikeThresholdReached { .. } => "strike_threshold_reached",
        }
    }

    pub fn actor(&self) -> MemberId {
        match self {
            Self::CommentCreated { actor, .. }
            | Self::ReplyCreated { actor, .. }
            | Self::ContentToggled { actor, .. }
            | Self::MemberFollowed { actor, .. }
            | Self::DocumentPublished { actor, .. }
            | Self::ReportEscalated { actor, .. }
            | Self::StrikeThresholdReached { actor, .. } => *actor,
        }
    }

    /// Members whose display names appear in the message.
    pub fn named_members(&self) -> Vec<MemberId> {
        match self {
            Self::StrikeThresholdReached { actor, member, .. } => vec![*actor, *member],
            other => vec![other.actor()],
        }
    }

    pub fn render(&self, names: &DisplayNames) -> RenderedNotification {
        let actor_id = self.actor();
        let actor = names.get(actor_id);

        match self {
            Self::CommentCreated {
                comment, target, ..
            } => RenderedNotification {
                kind: NotificationType::Comment,
                message: format!("{actor} commented on {}", target.subject()),
                data: json!({
                    "actorId": actor_id,
                    "documentId": target.document_id,
                    "commentId": comment.document_id,
                }),
            },
            Self::ReplyCreated {
                reply,
                parent,
                target,
                ..
            } => RenderedNotification {
                kind: NotificationType::Comment,
                message: format!(
                    "{actor} replied to your comment on {}",
                    target.subject()
                ),
                data: json!({
                    "actorId": actor_id,
                    "documentId": target.document_id,
                    "commentId": reply.document_id,
                    "parentId": parent.document_id,
                }),
            },
            Self::ContentToggled {
                action, content, ..
            } => {
                let (kind, verb) = match action {
                    ActionType::Like => (NotificationType::Like, "liked"),
                    ActionType::Upvote => (NotificationType::Upvote, "upvoted"),
                    ActionType::Follow => (NotificationType::Follow, "followed"),
                    ActionType::Downvote => (NotificationType::Upvote, "downvoted"),
                };
                RenderedNotification {
                    kind,
                    message: format!("{actor} {verb} {}", content.subject()),
                    data: json!({
                        "actorId": actor_id,
                        "documentId": content.document_id,
                        "actionType": action,
                    }),
                }
            }
            Self::MemberFollowed { followed, .. } => RenderedNotification {
                kind: NotificationType::Follow,
                message: format!("{actor} started following you"),
                data: json!({ "actorId": actor_id, "memberId": followed }),
            },
            Self::DocumentPublished { document, .. } => RenderedNotification {
                kind: NotificationType::Follow,
                message: format!("{actor} published {}", document.subject()),
                data: json!({
                    "actorId": actor_id,
                    "documentId": document.document_id,
                    "categoryIds": document.category_ids,
                }),
            },
            Self::ReportEscalated { report, .. } => RenderedNotification {
                kind: NotificationType::Report,
                message: format!(
                    "{actor} escalated a report on a {}: {}",
                    report.target_type.as_str(),
                    report.reason
                ),
                data: json!({
                    "actorId": actor_id,
                    "reportId": report.id,
                    "targetType": report.target_type,
                    "targetId": report.target_id,
                }),
            },
            Self::StrikeThresholdReached {
                member,
                strike_count,
                ..
            } => RenderedNotification {
                kind: NotificationType::StrikeThreshold,
                message: format!(
                    "{} has reached {strike_count} strikes",
                    names.get(*member)
                ),
                data: json!({
                    "actorId": actor_id,
                    "memberId": member,
                    "strikeCount": strike_count,
                }),
            },
        }
    }
}
