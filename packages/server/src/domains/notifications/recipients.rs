//! Follow-graph recipient resolution.

use std::collections::HashSet;

use anyhow::Result;

use super::events::FanOutEvent;
use crate::common::MemberId;
use crate::domains::content::{Document, DocumentKind};
use crate::domains::toggles::{ActionType, TargetType};
use crate::kernel::ServerDeps;

/// Ordered, deduplicated recipients with the acting member excluded.
#[derive(Debug, Clone)]
pub struct RecipientSet {
    actor: MemberId,
    seen: HashSet<MemberId>,
    ordered: Vec<MemberId>,
}

impl RecipientSet {
    pub fn new(actor: MemberId) -> Self {
        Self {
            actor,
            seen: HashSet::new(),
            ordered: Vec::new(),
        }
    }

    pub fn add(&mut self, member: MemberId) {
        if member != self.actor && self.seen.insert(member) {
            self.ordered.push(member);
        }
    }

    pub fn add_opt(&mut self, member: Option<MemberId>) {
        if let Some(member) = member {
            self.add(member);
        }
    }

    pub fn extend(&mut self, members: impl IntoIterator<Item = MemberId>) {
        for member in members {
            self.add(member);
        }
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn contains(&self, member: MemberId) -> bool {
        self.seen.contains(&member)
    }

    pub fn into_vec(self) -> Vec<MemberId> {
        self.ordered
    }
}

fn content_target_type(doc: &Document) -> TargetType {
    match doc.kind {
        DocumentKind::Trade => TargetType::Trade,
        DocumentKind::Post => TargetType::Post,
        DocumentKind::Comment => TargetType::Comment,
    }
}

async fn followers(deps: &ServerDeps, target_type: TargetType, target_id: &str) -> Result<Vec<MemberId>> {
    deps.toggles
        .toggle_user_ids(target_type, target_id, ActionType::Follow)
        .await
}

/// Compute who hears about `event`.
pub async fn resolve_recipients(deps: &ServerDeps, event: &FanOutEvent) -> Result<RecipientSet> {
    let mut recipients = RecipientSet::new(event.actor());

    match event {
        FanOutEvent::CommentCreated { target, .. } => {
            recipients.add_opt(target.author_id);
            recipients.extend(
                followers(deps, content_target_type(target), target.document_id.as_str()).await?,
            );
        }
        FanOutEvent::ReplyCreated { parent, .. } => {
            recipients.add_opt(parent.author_id);
        }
        FanOutEvent::ContentToggled { action, content, .. } => {
            if *action != ActionType::Downvote {
                recipients.add_opt(content.author_id);
            }
        }
        FanOutEvent::MemberFollowed { followed, .. } => {
            recipients.add(*followed);
        }
        FanOutEvent::DocumentPublished { document, .. } => {
            for category in &document.category_ids {
                recipients
                    .extend(followers(deps, TargetType::Category, &category.to_string()).await?);
            }
            if let Some(author) = document.author_id {
                recipients.extend(followers(deps, TargetType::User, &author.to_string()).await?);
                // Someone else published it: the owner hears too.
                recipients.add(author);
            }
        }
        FanOutEvent::ReportEscalated { .. } | FanOutEvent::StrikeThresholdReached { .. } => {
            recipients.extend(deps.members.admin_ids().await?);
        }
    }

    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_is_never_a_recipient() {
        let actor = MemberId::new();
        let mut set = RecipientSet::new(actor);
        set.add(actor);
        set.extend([actor, actor]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        let (a, b) = (MemberId::new(), MemberId::new());
        let mut set = RecipientSet::new(MemberId::new());
        set.extend([a, b, a, b, a]);
        assert_eq!(set.into_vec(), vec![a, b]);
    }
}
