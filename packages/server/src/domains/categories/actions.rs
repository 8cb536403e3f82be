//! Category moderator management.

use serde::Deserialize;
use tracing::info;

use super::models::{GrantStatus, ModeratorGrant};
use crate::common::{Actor, Capability, CategoryId, ForumError, ForumResult, MemberId, Viewer};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantModerator {
    pub category_id: CategoryId,
    pub member_id: MemberId,
    pub status: GrantStatus,
}

/// Append a moderator grant (admin only). The new row supersedes any
/// earlier grant for the same member and category.
pub async fn grant_moderator(
    deps: &ServerDeps,
    viewer: &Viewer,
    input: GrantModerator,
) -> ForumResult<ModeratorGrant> {
    let admin_id = viewer.require_auth()?;
    Actor::new(admin_id, viewer.is_admin)
        .can(Capability::ManageModerators)
        .check(deps)
        .await?;

    if deps.categories.find_category(input.category_id).await?.is_none() {
        return Err(ForumError::not_found("category"));
    }
    if deps.members.find_member(input.member_id).await?.is_none() {
        return Err(ForumError::not_found("member"));
    }

    let grant = ModeratorGrant::new(input.category_id, input.member_id, input.status);
    deps.categories.insert_grant(&grant).await?;

    info!(
        category_id = %grant.category_id,
        member_id = %grant.user_id,
        status = grant.status.as_str(),
        granted_by = %admin_id,
        "moderator grant recorded"
    );

    Ok(grant)
}

/// True when `member` holds an active latest grant on any of `categories`.
pub async fn is_active_moderator(
    deps: &ServerDeps,
    member: MemberId,
    categories: &[CategoryId],
) -> anyhow::Result<bool> {
    if categories.is_empty() {
        return Ok(false);
    }
    let grants = deps.categories.latest_grants(member, categories).await?;
    Ok(grants.iter().any(|g| g.status == GrantStatus::Active))
}
