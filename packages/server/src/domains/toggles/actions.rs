//! Idempotent on/off actions (like, follow, upvote, downvote).

use std::collections::BTreeMap;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::models::{ActionType, TargetType, ToggleAction, ToggleKey};
use crate::common::{CategoryId, DocumentId, ForumError, ForumResult, MemberId, ToggleActionId, Viewer};
use crate::domains::content::{fetch_public_document, Document, DocumentKind};
use crate::domains::notifications::{dispatch, FanOutEvent};
use crate::kernel::metrics::TOGGLE_CONFLICTS;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub action_type: String,
    pub target_type: String,
    pub target_id: String,
}

impl ToggleRequest {
    pub fn new(action_type: ActionType, target_type: TargetType, target_id: impl Into<String>) -> Self {
        Self {
            action_type: action_type.as_str().to_string(),
            target_type: target_type.as_str().to_string(),
            target_id: target_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleResult {
    pub active: bool,
    pub count: i64,
}

/// What a toggle points at, once resolved.
enum Target {
    Content(Document),
    Category,
    Member(MemberId),
}

fn parse_target_type(s: &str) -> ForumResult<TargetType> {
    TargetType::parse(s).map_err(|e| ForumError::bad_request(e.to_string()))
}

fn parse_action(target_type: TargetType, s: &str) -> ForumResult<ActionType> {
    let action = ActionType::parse(s).map_err(|e| ForumError::bad_request(e.to_string()))?;
    if !target_type.allows(action) {
        return Err(ForumError::bad_request(format!(
            "{} is not allowed on {}",
            action.as_str(),
            target_type.as_str()
        )));
    }
    Ok(action)
}

async fn resolve_target(deps: &ServerDeps, target_type: TargetType, target_id: &str) -> ForumResult<Target> {
    let not_found = || ForumError::not_found(format!("{} {target_id}", target_type.as_str()));

    match target_type {
        TargetType::Post | TargetType::Trade | TargetType::Comment => {
            let expected = match target_type {
                TargetType::Post => DocumentKind::Post,
                TargetType::Trade => DocumentKind::Trade,
                _ => DocumentKind::Comment,
            };
            let doc = fetch_public_document(deps, &DocumentId::new(target_id)).await?;
            if doc.kind != expected {
                return Err(not_found());
            }
            Ok(Target::Content(doc))
        }
        TargetType::Category => {
            let id = CategoryId::parse(target_id).map_err(|_| not_found())?;
            deps.categories
                .find_category(id)
                .await?
                .map(|_| Target::Category)
                .ok_or_else(not_found)
        }
        TargetType::User => {
            let id = MemberId::parse(target_id).map_err(|_| not_found())?;
            deps.members
                .find_member(id)
                .await?
                .map(|m| Target::Member(m.id))
                .ok_or_else(not_found)
        }
    }
}

/// Flip one ledger row and return the fresh count.
///
/// Toggles of the same key are serialized in-process, and the store's
/// uniqueness constraint covers concurrent writers elsewhere. The count is
/// always re-read from the ledger.
pub async fn toggle(deps: &ServerDeps, viewer: &Viewer, req: ToggleRequest) -> ForumResult<ToggleResult> {
    let member_id = viewer.require_auth()?;
    let target_type = parse_target_type(&req.target_type)?;
    let action_type = parse_action(target_type, &req.action_type)?;
    if req.target_id.trim().is_empty() {
        return Err(ForumError::bad_request("targetId is required"));
    }

    let key = ToggleKey {
        user_id: member_id,
        target_type,
        target_id: req.target_id,
        action_type,
    };

    // Switching off needs only the ledger row; the target may be hidden by now.
    let activated = {
        let _guard = deps.toggle_locks.lock(key.clone()).await;
        match deps.toggles.find_toggle(&key).await? {
            Some(existing) => {
                deps.toggles.delete_toggle(existing.id).await?;
                None
            }
            None => {
                let target = resolve_target(deps, target_type, &key.target_id).await?;
                if !deps.toggles.insert_toggle(&ToggleAction::new(&key)).await? {
                    // Another writer inserted the same key first; the row is on.
                    counter!(TOGGLE_CONFLICTS).increment(1);
                    debug!(target_id = %key.target_id, "toggle insert lost a race");
                }
                Some(target)
            }
        }
    };
    let active = activated.is_some();

    let count = deps
        .toggles
        .count_toggles(target_type, &key.target_id, action_type)
        .await?;

    info!(
        member_id = %member_id,
        target_type = target_type.as_str(),
        target_id = %key.target_id,
        action = action_type.as_str(),
        active,
        count,
        "toggle"
    );

    if let Some(target) = activated {
        notify_activation(deps, member_id, action_type, target).await;
    }

    Ok(ToggleResult { active, count })
}

async fn notify_activation(deps: &ServerDeps, actor: MemberId, action: ActionType, target: Target) {
    let event = match target {
        Target::Content(content)
            if content.kind != DocumentKind::Comment && action != ActionType::Downvote =>
        {
            FanOutEvent::ContentToggled {
                actor,
                action,
                content,
            }
        }
        Target::Member(followed) if action == ActionType::Follow => {
            FanOutEvent::MemberFollowed { actor, followed }
        }
        _ => return,
    };
    dispatch(deps, event).await;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ToggleSummary {
    /// Count per action type valid for the target.
    pub counts: BTreeMap<ActionType, i64>,
    /// The viewer's own active rows, by action type.
    pub mine: BTreeMap<ActionType, ToggleActionId>,
}

/// Counts for every action valid on the target, plus the caller's own rows.
pub async fn summary(
    deps: &ServerDeps,
    viewer: &Viewer,
    target_type: &str,
    target_id: &str,
) -> ForumResult<ToggleSummary> {
    let target_type = parse_target_type(target_type)?;
    if target_id.trim().is_empty() {
        return Err(ForumError::bad_request("targetId is required"));
    }

    let mut summary = ToggleSummary::default();
    for action in target_type.allowed_actions() {
        let count = deps
            .toggles
            .count_toggles(target_type, target_id, *action)
            .await?;
        summary.counts.insert(*action, count);
    }

    if let Some(member_id) = viewer.member_id {
        for action in deps
            .toggles
            .toggles_for_user(member_id, target_type, target_id)
            .await?
        {
            summary.mine.insert(action.action_type, action.id);
        }
    }

    Ok(summary)
}
