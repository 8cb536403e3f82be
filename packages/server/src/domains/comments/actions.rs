//! Comments and replies on published posts and trades.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::common::{DocumentId, ForumError, ForumResult, Viewer};
use crate::domains::content::{
    fetch_public_document, list_comments, sync_relations, Document, DocumentKind, NewDocument,
    RelationSet,
};
use crate::domains::members::require_not_banned;
use crate::domains::notifications::{dispatch, FanOutEvent};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    pub target_id: DocumentId,
    pub parent_id: Option<DocumentId>,
}

/// The parent comment, checked to belong to the same thread.
async fn resolve_parent(
    deps: &ServerDeps,
    parent_id: &DocumentId,
    target_id: &DocumentId,
) -> ForumResult<Document> {
    let parent = fetch_public_document(deps, parent_id).await?;
    if parent.kind != DocumentKind::Comment {
        return Err(ForumError::bad_request("parentId must be a comment"));
    }
    if parent.target_document_id.as_ref() != Some(target_id) {
        return Err(ForumError::bad_request(
            "parent comment belongs to a different thread",
        ));
    }
    Ok(parent)
}

/// Create a comment (or a reply when `parent_id` is set).
///
/// Comments skip the draft stage from the caller's point of view: the draft
/// row is written, the author applied, and the published row copied from it
/// before returning.
pub async fn create_comment(
    deps: &ServerDeps,
    viewer: &Viewer,
    input: CreateComment,
) -> ForumResult<Document> {
    let member_id = viewer.require_auth()?;
    let content = input.content.trim();
    if content.is_empty() {
        return Err(ForumError::bad_request("content is required"));
    }
    require_not_banned(member_id, deps).await?;

    let target = fetch_public_document(deps, &input.target_id).await?;
    if target.kind == DocumentKind::Comment {
        return Err(ForumError::bad_request(
            "comments attach to posts or trades",
        ));
    }
    if target.comments_blocked() {
        return Err(ForumError::forbidden("comments are closed on this content"));
    }

    let parent = match &input.parent_id {
        Some(parent_id) => Some(resolve_parent(deps, parent_id, &target.document_id).await?),
        None => None,
    };

    let draft = deps
        .documents
        .create(&NewDocument {
            document_id: DocumentId::generate(),
            kind: DocumentKind::Comment,
            title: None,
            symbol: None,
            body: content.to_string(),
            category_ids: Vec::new(),
            target_document_id: Some(target.document_id.clone()),
            parent_document_id: parent.as_ref().map(|p| p.document_id.clone()),
        })
        .await?;

    sync_relations(
        deps,
        &draft.document_id,
        &RelationSet {
            author_id: Some(member_id),
            tags: None,
        },
    )
    .await?;

    let comment = deps
        .documents
        .publish(&draft.document_id, Utc::now())
        .await?
        .ok_or_else(|| ForumError::not_found(format!("document {}", draft.document_id)))?;

    info!(
        document_id = %comment.document_id,
        target_id = %target.document_id,
        reply = parent.is_some(),
        author_id = %member_id,
        "comment created"
    );

    let event = match parent {
        Some(parent) => FanOutEvent::ReplyCreated {
            actor: member_id,
            reply: comment.clone(),
            parent,
            target,
        },
        None => FanOutEvent::CommentCreated {
            actor: member_id,
            comment: comment.clone(),
            target,
        },
    };
    dispatch(deps, event).await;

    Ok(comment)
}

/// Public thread of a post or trade, oldest first.
pub async fn thread(deps: &ServerDeps, target_id: &DocumentId) -> ForumResult<Vec<Document>> {
    list_comments(deps, target_id).await
}
