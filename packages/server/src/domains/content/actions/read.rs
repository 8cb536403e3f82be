//! Read paths over the two variants.
//!
//! Single-document reads treat the draft as the source of truth for
//! relations and moderation. Public reads additionally require a published
//! row and hide anything whose resolved moderation is `delete`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::common::{Actor, Capability, CategoryId, DocumentId, ForumError, ForumResult, Viewer};
use crate::domains::content::models::{Document, DocumentFilter, DocumentKind, Variant};
use crate::kernel::ServerDeps;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// The canonical view of a logical document: the draft when there is one,
/// otherwise the published row.
pub async fn resolve_document(deps: &ServerDeps, id: &DocumentId) -> ForumResult<Document> {
    if let Some(draft) = deps.documents.find_one(id, Variant::Draft).await? {
        return Ok(draft);
    }
    deps.documents
        .find_one(id, Variant::Published)
        .await?
        .ok_or_else(|| ForumError::not_found(format!("document {id}")))
}

/// Published content as the public sees it. Missing, draft-only and hidden
/// documents are all `NotFound`.
pub async fn fetch_public_document(deps: &ServerDeps, id: &DocumentId) -> ForumResult<Document> {
    let published = deps
        .documents
        .find_one(id, Variant::Published)
        .await?
        .ok_or_else(|| ForumError::not_found(format!("document {id}")))?;

    let view = match deps.documents.find_one(id, Variant::Draft).await? {
        Some(draft) => published.with_relations_from(&draft),
        None => published,
    };

    if view.is_hidden() {
        return Err(ForumError::not_found(format!("document {id}")));
    }
    Ok(view)
}

/// Categories that govern moderation of `doc`. Comments are moderated
/// through the document they belong to.
pub async fn moderation_categories(
    deps: &ServerDeps,
    doc: &Document,
) -> ForumResult<Vec<CategoryId>> {
    match (doc.kind, &doc.target_document_id) {
        (DocumentKind::Comment, Some(target)) => match resolve_document(deps, target).await {
            Ok(target) => Ok(target.category_ids),
            Err(ForumError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        },
        _ => Ok(doc.category_ids.clone()),
    }
}

/// Owner, admin or active moderator view. Includes hidden and draft-only
/// documents.
pub async fn fetch_for_viewer(
    deps: &ServerDeps,
    viewer: &Viewer,
    id: &DocumentId,
) -> ForumResult<Document> {
    let member_id = viewer.require_auth()?;
    let doc = resolve_document(deps, id).await?;

    if doc.is_owned_by(member_id) {
        return Ok(doc);
    }
    let manage = Actor::new(member_id, viewer.is_admin)
        .can(Capability::ManageContent {
            owner: doc.author_id,
        })
        .check(deps)
        .await;
    if manage.is_ok() {
        return Ok(doc);
    }

    let categories = moderation_categories(deps, &doc).await?;
    Actor::new(member_id, viewer.is_admin)
        .can(Capability::ModerateCategories(categories))
        .check(deps)
        .await?;
    Ok(doc)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocuments {
    pub kind: Option<DocumentKind>,
    #[serde(alias = "category")]
    pub category_id: Option<CategoryId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Public listing. Only rows that are published and whose resolved
/// moderation is not `delete`; a draft-only document never appears.
pub async fn list_published(deps: &ServerDeps, query: ListDocuments) -> ForumResult<Vec<Document>> {
    let filter = DocumentFilter {
        kind: query.kind,
        kinds: query
            .kind
            .is_none()
            .then(|| vec![DocumentKind::Post, DocumentKind::Trade]),
        category_id: query.category_id,
        exclude_hidden: true,
        limit: Some(query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)),
        offset: Some(query.offset.unwrap_or(0).max(0)),
        ..Default::default()
    };

    list_public(deps, &filter).await
}

/// Public comments on a post or trade, oldest first.
pub async fn list_comments(deps: &ServerDeps, target_id: &DocumentId) -> ForumResult<Vec<Document>> {
    fetch_public_document(deps, target_id).await?;

    let filter = DocumentFilter {
        kind: Some(DocumentKind::Comment),
        target_document_id: Some(target_id.clone()),
        exclude_hidden: true,
        ..Default::default()
    };
    let mut comments = list_public(deps, &filter).await?;
    comments.reverse();
    Ok(comments)
}

/// Paging happens in the store, so every filter that can be expressed on the
/// published row is part of `filter`. The draft overlay is checked again
/// here in case a published write missed a moderation change.
async fn list_public(deps: &ServerDeps, filter: &DocumentFilter) -> ForumResult<Vec<Document>> {
    let published: Vec<Document> = deps
        .documents
        .find_many(filter, Variant::Published)
        .await?
        .into_iter()
        .filter(Document::is_published)
        .collect();
    if published.is_empty() {
        return Ok(published);
    }

    let ids: Vec<DocumentId> = published.iter().map(|d| d.document_id.clone()).collect();
    let drafts: HashMap<DocumentId, Document> = deps
        .documents
        .find_many(
            &DocumentFilter {
                document_ids: Some(ids),
                ..Default::default()
            },
            Variant::Draft,
        )
        .await?
        .into_iter()
        .map(|d| (d.document_id.clone(), d))
        .collect();

    Ok(published
        .into_iter()
        .map(|row| match drafts.get(&row.document_id) {
            Some(draft) => row.with_relations_from(draft),
            None => row,
        })
        .filter(|view| !view.is_hidden() && filter.matches(view))
        .collect())
}
