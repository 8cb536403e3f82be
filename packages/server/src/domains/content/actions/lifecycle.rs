//! Create, edit, publish and delete posts and trades.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::indexing::{index_document, unindex_document};
use super::read::resolve_document;
use crate::common::{
    Actor, Capability, CategoryId, DocumentId, ForumError, ForumResult, MemberId, Viewer,
};
use crate::domains::content::models::{
    Document, DocumentKind, DocumentPatch, NewDocument, Relation, RelationSet, Variant,
};
use crate::domains::content::sync::{sync_mutation, sync_relations};
use crate::domains::members::require_not_banned;
use crate::domains::notifications::{dispatch, FanOutEvent};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    pub kind: DocumentKind,
    pub title: Option<String>,
    pub symbol: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Admins may create on behalf of another member.
    pub author: Option<Relation>,
}

impl CreateDocument {
    fn validate(&self) -> ForumResult<()> {
        match self.kind {
            DocumentKind::Comment => {
                return Err(ForumError::bad_request(
                    "comments are created through the comments endpoint",
                ))
            }
            DocumentKind::Post => {
                if is_blank(&self.title) {
                    return Err(ForumError::bad_request("title is required"));
                }
                if self.category_ids.is_empty() {
                    return Err(ForumError::bad_request("at least one category is required"));
                }
            }
            DocumentKind::Trade => {
                if is_blank(&self.symbol) {
                    return Err(ForumError::bad_request("symbol is required"));
                }
            }
        }
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

async fn ensure_categories_exist(deps: &ServerDeps, ids: &[CategoryId]) -> ForumResult<()> {
    for id in ids {
        if deps.categories.find_category(*id).await?.is_none() {
            return Err(ForumError::bad_request(format!("unknown category {id}")));
        }
    }
    Ok(())
}

/// Create a post or trade as a draft.
///
/// Author and tags are not accepted by the creation primitive, so they are
/// applied right after through the relation-set path.
pub async fn create_document(
    deps: &ServerDeps,
    viewer: &Viewer,
    input: CreateDocument,
) -> ForumResult<Document> {
    let member_id = viewer.require_auth()?;
    input.validate()?;
    require_not_banned(member_id, deps).await?;

    let author = resolve_author(viewer, member_id, input.author.as_ref())?;
    ensure_categories_exist(deps, &input.category_ids).await?;

    let draft = deps
        .documents
        .create(&NewDocument {
            document_id: DocumentId::generate(),
            kind: input.kind,
            title: input.title,
            symbol: input.symbol,
            body: input.body,
            category_ids: input.category_ids,
            target_document_id: None,
            parent_document_id: None,
        })
        .await?;

    let relations = RelationSet {
        author_id: Some(author),
        tags: (!input.tags.is_empty()).then_some(input.tags),
    };
    let outcome = sync_relations(deps, &draft.document_id, &relations).await?;

    info!(
        document_id = %draft.document_id,
        kind = draft.kind.as_str(),
        author_id = %author,
        "document created"
    );

    Ok(outcome.draft)
}

fn resolve_author(
    viewer: &Viewer,
    member_id: MemberId,
    requested: Option<&Relation>,
) -> ForumResult<MemberId> {
    match requested.map(Relation::id) {
        Some(author) if author != member_id => {
            if !viewer.is_admin {
                return Err(ForumError::forbidden(
                    "only admins may create content for another member",
                ));
            }
            Ok(author)
        }
        _ => Ok(member_id),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub symbol: Option<String>,
    pub body: Option<String>,
    pub category_ids: Option<Vec<CategoryId>>,
    pub tags: Option<Vec<String>>,
}

impl From<UpdateDocument> for DocumentPatch {
    fn from(input: UpdateDocument) -> Self {
        Self {
            title: input.title,
            symbol: input.symbol,
            body: input.body,
            category_ids: input.category_ids,
            tags: input.tags,
            ..Default::default()
        }
    }
}

/// Owner edit, mirrored onto the published variant when there is one.
pub async fn update_document(
    deps: &ServerDeps,
    viewer: &Viewer,
    id: &DocumentId,
    input: UpdateDocument,
) -> ForumResult<Document> {
    let member_id = viewer.require_auth()?;
    let patch = DocumentPatch::from(input);
    let (fields, relations) = patch.clone().split();
    if fields.is_empty() && relations.is_empty() {
        return Err(ForumError::bad_request("nothing to update"));
    }

    let current = resolve_document(deps, id).await?;
    Actor::new(member_id, viewer.is_admin)
        .can(Capability::EditContent {
            owner: current.author_id,
        })
        .check(deps)
        .await?;

    if current.is_hidden() {
        return Err(ForumError::forbidden("content removed by a moderator is read-only"));
    }
    if let Some(categories) = &patch.category_ids {
        if current.kind == DocumentKind::Post && categories.is_empty() {
            return Err(ForumError::bad_request("at least one category is required"));
        }
        ensure_categories_exist(deps, categories).await?;
    }

    let outcome = sync_mutation(deps, id, patch).await?;
    if outcome.published_applied() {
        index_document(deps, id).await;
    }

    info!(document_id = %id, member_id = %member_id, "document updated");
    Ok(outcome.draft)
}

/// Copy the draft into the published variant.
///
/// Followers hear about the first publish only; republishing refreshes the
/// published row and the search index silently.
pub async fn publish_document(
    deps: &ServerDeps,
    viewer: &Viewer,
    id: &DocumentId,
) -> ForumResult<Document> {
    let member_id = viewer.require_auth()?;
    let draft = deps
        .documents
        .find_one(id, Variant::Draft)
        .await?
        .ok_or_else(|| ForumError::not_found(format!("document {id}")))?;

    if draft.kind == DocumentKind::Comment {
        return Err(ForumError::bad_request("comments are published on creation"));
    }
    Actor::new(member_id, viewer.is_admin)
        .can(Capability::ManageContent {
            owner: draft.author_id,
        })
        .check(deps)
        .await?;

    let first_publish = deps
        .documents
        .find_one(id, Variant::Published)
        .await?
        .is_none();

    let published = deps
        .documents
        .publish(id, Utc::now())
        .await?
        .ok_or_else(|| ForumError::not_found(format!("document {id}")))?;

    if published.is_hidden() {
        unindex_document(deps, id).await;
    } else {
        index_document(deps, id).await;
    }

    info!(document_id = %id, member_id = %member_id, first_publish, "document published");

    if first_publish && !published.is_hidden() {
        dispatch(
            deps,
            FanOutEvent::DocumentPublished {
                actor: member_id,
                document: published.clone(),
            },
        )
        .await;
    }

    Ok(published)
}

/// Remove both variants and the search entry.
pub async fn delete_document(deps: &ServerDeps, viewer: &Viewer, id: &DocumentId) -> ForumResult<()> {
    let member_id = viewer.require_auth()?;
    let current = resolve_document(deps, id).await?;

    Actor::new(member_id, viewer.is_admin)
        .can(Capability::ManageContent {
            owner: current.author_id,
        })
        .check(deps)
        .await?;

    let removed = deps.documents.delete(id).await?;
    unindex_document(deps, id).await;

    info!(document_id = %id, member_id = %member_id, removed, "document deleted");
    Ok(())
}
