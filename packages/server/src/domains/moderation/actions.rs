//! Moderation transitions.

use serde::Serialize;
use tracing::info;

use super::state::{search_sync, ModerationAction, ModerationAuthority, SearchSync};
use crate::common::{Actor, Capability, DocumentId, ForumResult, Viewer};
use crate::domains::content::{
    index_document, moderation_categories, resolve_document, sync_fields, unindex_document,
    Document, FieldPatch, ModerationStatus, PublishedWrite,
};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    pub previous: Option<ModerationStatus>,
    /// The draft after the write.
    pub document: Document,
    /// Whether the published variant was updated too.
    pub published_synced: bool,
}

async fn authorize(
    deps: &ServerDeps,
    doc: &Document,
    authority: ModerationAuthority,
) -> ForumResult<()> {
    match authority {
        ModerationAuthority::Moderator {
            member_id,
            is_admin,
        } => {
            let categories = moderation_categories(deps, doc).await?;
            Actor::new(member_id, is_admin)
                .can(Capability::ModerateCategories(categories))
                .check(deps)
                .await?;
        }
        ModerationAuthority::ReportReview { reviewer, is_admin } => {
            Actor::new(reviewer, is_admin)
                .can(Capability::ReviewReports)
                .check(deps)
                .await?;
        }
    }
    Ok(())
}

/// Move a document to `next` on both variants.
///
/// Order: authorize, write draft, mirror to published, then search. No
/// notifications are sent for moderation. Concurrent transitions on the same
/// document are last-write-wins.
pub async fn apply_moderation(
    deps: &ServerDeps,
    id: &DocumentId,
    next: Option<ModerationStatus>,
    authority: ModerationAuthority,
) -> ForumResult<ModerationResult> {
    let current = resolve_document(deps, id).await?;
    authorize(deps, &current, authority).await?;

    let previous = current.moderation_status;
    let patch = FieldPatch {
        moderation_status: Some(next),
        ..Default::default()
    };
    let outcome = sync_fields(deps, id, &patch).await?;

    let published = !matches!(outcome.published, PublishedWrite::Missing);
    match search_sync(previous, next, published) {
        SearchSync::Remove => unindex_document(deps, id).await,
        SearchSync::Upsert => index_document(deps, id).await,
        SearchSync::Nothing => {}
    }

    info!(
        document_id = %id,
        actor = %authority.actor(),
        path = authority.path(),
        from = previous.map(|s| s.as_str()).unwrap_or("none"),
        to = next.map(|s| s.as_str()).unwrap_or("none"),
        "moderation applied"
    );

    Ok(ModerationResult {
        previous,
        published_synced: outcome.published_applied(),
        document: outcome.draft,
    })
}

/// Moderator-path entry point used by the HTTP layer.
pub async fn moderate(
    deps: &ServerDeps,
    viewer: &Viewer,
    id: &DocumentId,
    action: ModerationAction,
) -> ForumResult<ModerationResult> {
    let member_id = viewer.require_auth()?;
    apply_moderation(
        deps,
        id,
        action.target_status(),
        ModerationAuthority::Moderator {
            member_id,
            is_admin: viewer.is_admin,
        },
    )
    .await
}
