//! Test fixtures for creating test data.
//!
//! Members and categories go straight into the store; content goes through
//! the domain actions so it is shaped exactly as production creates it.

use agora_core::common::{CategoryId, DocumentId, MemberId, Viewer};
use agora_core::domains::categories::{Category, GrantStatus, ModeratorGrant};
use agora_core::domains::comments::{create_comment, CreateComment};
use agora_core::domains::content::{
    create_document, publish_document, CreateDocument, Document, DocumentKind,
};
use agora_core::domains::members::{Member, MemberRole};
use agora_core::domains::toggles::{toggle, ActionType, TargetType, ToggleRequest, ToggleResult};

use super::TestHarness;

impl TestHarness {
    pub async fn member(&self, name: &str) -> Viewer {
        self.insert_member(Member::new(name, MemberRole::Member)).await
    }

    pub async fn admin(&self, name: &str) -> Viewer {
        self.insert_member(Member::new(name, MemberRole::Admin)).await
    }

    pub async fn insert_member(&self, member: Member) -> Viewer {
        let viewer = Viewer::authenticated(member.id, member.is_admin());
        self.deps
            .members
            .insert_member(&member)
            .await
            .expect("Failed to insert member");
        viewer
    }

    pub async fn category(&self, name: &str) -> CategoryId {
        let category = Category::new(name);
        self.deps
            .categories
            .insert_category(&category)
            .await
            .expect("Failed to insert category");
        category.id
    }

    pub async fn grant(&self, category: CategoryId, member: &Viewer, status: GrantStatus) {
        let grant = ModeratorGrant::new(category, id(member), status);
        self.deps
            .categories
            .insert_grant(&grant)
            .await
            .expect("Failed to insert grant");
    }

    /// Draft post owned by `author`.
    pub async fn draft_post(&self, author: &Viewer, title: &str, categories: &[CategoryId]) -> Document {
        create_document(
            &self.deps,
            author,
            CreateDocument {
                kind: DocumentKind::Post,
                title: Some(title.to_string()),
                symbol: None,
                body: format!("{title} body"),
                category_ids: categories.to_vec(),
                tags: vec![],
                author: None,
            },
        )
        .await
        .expect("Failed to create post")
    }

    /// Post created and published by `author`.
    pub async fn published_post(&self, author: &Viewer, title: &str, categories: &[CategoryId]) -> Document {
        let draft = self.draft_post(author, title, categories).await;
        publish_document(&self.deps, author, &draft.document_id)
            .await
            .expect("Failed to publish post")
    }

    pub async fn comment(&self, author: &Viewer, target: &DocumentId, content: &str) -> Document {
        create_comment(
            &self.deps,
            author,
            CreateComment {
                content: content.to_string(),
                target_id: target.clone(),
                parent_id: None,
            },
        )
        .await
        .expect("Failed to create comment")
    }

    pub async fn toggle(
        &self,
        viewer: &Viewer,
        action: ActionType,
        target_type: TargetType,
        target_id: impl Into<String>,
    ) -> ToggleResult {
        toggle(
            &self.deps,
            viewer,
            ToggleRequest::new(action, target_type, target_id),
        )
        .await
        .expect("Failed to toggle")
    }

    pub async fn follow_category(&self, viewer: &Viewer, category: CategoryId) -> ToggleResult {
        self.toggle(viewer, ActionType::Follow, TargetType::Category, category.to_string())
            .await
    }
}

/// The member id behind an authenticated viewer.
pub fn id(viewer: &Viewer) -> MemberId {
    viewer.member_id.expect("viewer is anonymous")
}
