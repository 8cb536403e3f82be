//! Dual-variant synchronization.
//!
//! A logical document has one draft row and at most one published row.
//! Every mutation is written as two phases:
//!
//! 1. [`write_draft`]: authoritative. If it fails, the operation fails.
//! 2. [`write_published_if_exists`]: best-effort. A missing published row is
//!    the normal "not yet published" state, and a failed write is counted
//!    and logged at debug but never surfaced.
//!
//! The draft is always written first and awaited before the published write
//! is issued.

use metrics::counter;
use tracing::debug;

use super::models::{Document, DocumentPatch, FieldPatch, RelationSet, Variant};
use crate::common::{DocumentId, ForumError, ForumResult};
use crate::kernel::metrics::{SYNC_PUBLISHED_FAILED, SYNC_PUBLISHED_MISSING};
use crate::kernel::ServerDeps;

/// Result of the best-effort published phase.
#[derive(Debug, Clone)]
pub enum PublishedWrite {
    Applied(Document),
    /// No published variant exists yet.
    Missing,
    /// The write was attempted and failed; the draft is still authoritative.
    Failed(String),
}

impl PublishedWrite {
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Applied(doc) => Some(doc),
            _ => None,
        }
    }

    /// Combine the outcomes of two consecutive writes to the same row.
    fn then(self, later: PublishedWrite) -> PublishedWrite {
        match self {
            Self::Failed(e) => Self::Failed(e),
            _ => later,
        }
    }
}

/// Which phases of a synchronized mutation succeeded.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub draft: Document,
    pub published: PublishedWrite,
}

impl SyncOutcome {
    pub fn published_applied(&self) -> bool {
        matches!(self.published, PublishedWrite::Applied(_))
    }
}

#[derive(Clone, Copy)]
enum Write<'a> {
    Fields(&'a FieldPatch),
    Relations(&'a RelationSet),
}

impl Write<'_> {
    async fn apply(
        self,
        deps: &ServerDeps,
        id: &DocumentId,
        variant: Variant,
    ) -> anyhow::Result<Option<Document>> {
        match self {
            Self::Fields(patch) => deps.documents.update(id, variant, patch).await,
            Self::Relations(relations) => deps.documents.set_relations(id, variant, relations).await,
        }
    }
}

/// Phase one: write the draft. A missing draft is `NotFound`; a store error
/// is fatal.
async fn write_draft(deps: &ServerDeps, id: &DocumentId, write: Write<'_>) -> ForumResult<Document> {
    write
        .apply(deps, id, Variant::Draft)
        .await?
        .ok_or_else(|| ForumError::not_found(format!("document {id}")))
}

/// Phase two: mirror the write onto the published variant when there is one.
async fn write_published_if_exists(
    deps: &ServerDeps,
    id: &DocumentId,
    write: Write<'_>,
) -> PublishedWrite {
    match write.apply(deps, id, Variant::Published).await {
        Ok(Some(doc)) => PublishedWrite::Applied(doc),
        Ok(None) => {
            counter!(SYNC_PUBLISHED_MISSING).increment(1);
            debug!(document_id = %id, "no published variant to mirror");
            PublishedWrite::Missing
        }
        Err(e) => {
            counter!(SYNC_PUBLISHED_FAILED).increment(1);
            debug!(document_id = %id, error = %e, "published variant write failed");
            PublishedWrite::Failed(e.to_string())
        }
    }
}

async fn two_phase(deps: &ServerDeps, id: &DocumentId, write: Write<'_>) -> ForumResult<SyncOutcome> {
    let draft = write_draft(deps, id, write).await?;
    let published = write_published_if_exists(deps, id, write).await;
    Ok(SyncOutcome { draft, published })
}

/// Apply field changes to both variants.
pub async fn sync_fields(
    deps: &ServerDeps,
    id: &DocumentId,
    patch: &FieldPatch,
) -> ForumResult<SyncOutcome> {
    two_phase(deps, id, Write::Fields(patch)).await
}

/// Apply author/tag changes to both variants through the relation-set path.
pub async fn sync_relations(
    deps: &ServerDeps,
    id: &DocumentId,
    relations: &RelationSet,
) -> ForumResult<SyncOutcome> {
    two_phase(deps, id, Write::Relations(relations)).await
}

/// Apply a caller's patch to both variants.
///
/// Author and tags are split out of the field write and re-applied through
/// [`sync_relations`]. The returned draft reflects both writes.
pub async fn sync_mutation(
    deps: &ServerDeps,
    id: &DocumentId,
    patch: DocumentPatch,
) -> ForumResult<SyncOutcome> {
    let (fields, relations) = patch.split();

    match (fields.is_empty(), relations.is_empty()) {
        (true, true) => Err(ForumError::bad_request("nothing to update")),
        (false, true) => sync_fields(deps, id, &fields).await,
        (true, false) => sync_relations(deps, id, &relations).await,
        (false, false) => {
            let first = sync_fields(deps, id, &fields).await?;
            let second = sync_relations(deps, id, &relations).await?;
            Ok(SyncOutcome {
                draft: second.draft,
                published: first.published.then(second.published),
            })
        }
    }
}
