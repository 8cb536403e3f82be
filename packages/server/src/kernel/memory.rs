//! In-memory implementation of every store trait.
//!
//! Used by the test harness and for running the server without Postgres.
//! Behaves like the Postgres store, including the toggle uniqueness
//! constraint and "latest grant wins" reads. Failure switches let tests
//! exercise the best-effort paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::traits::BaseStoreHealth;
use crate::common::{CategoryId, DocumentId, MemberId, NotificationId, ReportId, ToggleActionId};
use crate::domains::categories::models::latest_per_category;
use crate::domains::categories::{Category, CategoryStore, ModeratorGrant};
use crate::domains::content::{
    Document, DocumentFilter, DocumentStore, FieldPatch, NewDocument, RelationSet, Variant,
};
use crate::domains::members::{Member, MemberStore};
use crate::domains::notifications::{Notification, NotificationStore};
use crate::domains::reports::{Report, ReportStatus, ReportStore, ReportTargetType};
use crate::domains::toggles::{ActionType, TargetType, ToggleAction, ToggleKey, ToggleStore};

#[derive(Default)]
struct State {
    members: HashMap<MemberId, Member>,
    categories: HashMap<CategoryId, Category>,
    grants: Vec<ModeratorGrant>,
    documents: HashMap<(DocumentId, Variant), Document>,
    toggles: HashMap<ToggleKey, ToggleAction>,
    notifications: Vec<Notification>,
    reports: Vec<Report>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    next_row_id: AtomicI64,
    fail_published_writes: AtomicBool,
    fail_notification_inserts: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to a published variant return an error.
    pub fn set_fail_published_writes(&self, fail: bool) {
        self.fail_published_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every notification insert return an error.
    pub fn set_fail_notification_inserts(&self, fail: bool) {
        self.fail_notification_inserts.store(fail, Ordering::SeqCst);
    }

    fn row_id(&self) -> i64 {
        self.next_row_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_published_write(&self, variant: Variant) -> Result<()> {
        if variant == Variant::Published && self.fail_published_writes.load(Ordering::SeqCst) {
            anyhow::bail!("published variant write rejected");
        }
        Ok(())
    }
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (DateTime<Utc>, i64),
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

fn page<T>(items: Vec<T>, limit: Option<i64>, offset: Option<i64>) -> Vec<T> {
    let offset = offset.unwrap_or(0).max(0) as usize;
    let iter = items.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit.max(0) as usize).collect(),
        None => iter.collect(),
    }
}

#[async_trait]
impl MemberStore for InMemoryStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        let mut state = self.state.write().await;
        if state.members.contains_key(&member.id) {
            anyhow::bail!("member {} already exists", member.id);
        }
        state.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.state.read().await.members.get(&id).cloned())
    }

    async fn find_members(&self, ids: &[MemberId]) -> Result<Vec<Member>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.members.get(id).cloned())
            .collect())
    }

    async fn admin_ids(&self) -> Result<Vec<MemberId>> {
        let state = self.state.read().await;
        let mut admins: Vec<&Member> = state.members.values().filter(|m| m.is_admin()).collect();
        admins.sort_by_key(|m| m.created_at);
        Ok(admins.into_iter().map(|m| m.id).collect())
    }

    async fn clear_ban(&self, id: MemberId) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(member) = state.members.get_mut(&id) {
            member.banned = false;
            member.banned_until = None;
            member.ban_reason = None;
        }
        Ok(())
    }

    async fn set_strike_count(&self, id: MemberId, strike_count: i32) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(member) = state.members.get_mut(&id) {
            member.strike_count = strike_count;
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn insert_category(&self, category: &Category) -> Result<()> {
        let mut state = self.state.write().await;
        if state.categories.values().any(|c| c.slug == category.slug) {
            anyhow::bail!("category slug {} already exists", category.slug);
        }
        state.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn insert_grant(&self, grant: &ModeratorGrant) -> Result<()> {
        self.state.write().await.grants.push(grant.clone());
        Ok(())
    }

    async fn latest_grants(
        &self,
        member: MemberId,
        categories: &[CategoryId],
    ) -> Result<Vec<ModeratorGrant>> {
        let state = self.state.read().await;
        let matching = state
            .grants
            .iter()
            .filter(|g| g.user_id == member && categories.contains(&g.category_id))
            .cloned();
        Ok(latest_per_category(matching))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_one(&self, id: &DocumentId, variant: Variant) -> Result<Option<Document>> {
        let state = self.state.read().await;
        Ok(state.documents.get(&(id.clone(), variant)).cloned())
    }

    async fn find_many(&self, filter: &DocumentFilter, variant: Variant) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let mut docs: Vec<Document> = state
            .documents
            .values()
            .filter(|d| d.variant == variant && filter.matches(d))
            .cloned()
            .collect();
        newest_first(&mut docs, |d| (d.created_at, d.id));
        Ok(page(docs, filter.limit, filter.offset))
    }

    async fn count(&self, filter: &DocumentFilter, variant: Variant) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .values()
            .filter(|d| d.variant == variant && filter.matches(d))
            .count() as i64)
    }

    async fn create(&self, data: &NewDocument) -> Result<Document> {
        let mut state = self.state.write().await;
        let key = (data.document_id.clone(), Variant::Draft);
        if state.documents.contains_key(&key) {
            anyhow::bail!("document {} already exists", data.document_id);
        }

        let now = Utc::now();
        let doc = Document {
            id: self.row_id(),
            document_id: data.document_id.clone(),
            variant: Variant::Draft,
            kind: data.kind,
            title: data.title.clone(),
            symbol: data.symbol.clone(),
            body: data.body.clone(),
            author_id: None,
            category_ids: data.category_ids.clone(),
            tags: Vec::new(),
            target_document_id: data.target_document_id.clone(),
            parent_document_id: data.parent_document_id.clone(),
            moderation_status: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        state.documents.insert(key, doc.clone());
        Ok(doc)
    }

    async fn publish(
        &self,
        id: &DocumentId,
        published_at: DateTime<Utc>,
    ) -> Result<Option<Document>> {
        self.check_published_write(Variant::Published)?;
        let mut state = self.state.write().await;
        let Some(draft) = state.documents.get(&(id.clone(), Variant::Draft)).cloned() else {
            return Ok(None);
        };

        let key = (id.clone(), Variant::Published);
        let (row_id, first_published) = match state.documents.get(&key) {
            Some(existing) => (existing.id, existing.published_at),
            None => (self.row_id(), None),
        };

        let published = Document {
            id: row_id,
            variant: Variant::Published,
            published_at: Some(first_published.unwrap_or(published_at)),
            updated_at: Utc::now(),
            ..draft
        };
        state.documents.insert(key, published.clone());
        Ok(Some(published))
    }

    async fn update(
        &self,
        id: &DocumentId,
        variant: Variant,
        patch: &FieldPatch,
    ) -> Result<Option<Document>> {
        self.check_published_write(variant)?;
        let mut state = self.state.write().await;
        Ok(state.documents.get_mut(&(id.clone(), variant)).map(|doc| {
            patch.apply_to(doc);
            doc.updated_at = Utc::now();
            doc.clone()
        }))
    }

    async fn set_relations(
        &self,
        id: &DocumentId,
        variant: Variant,
        relations: &RelationSet,
    ) -> Result<Option<Document>> {
        self.check_published_write(variant)?;
        let mut state = self.state.write().await;
        Ok(state.documents.get_mut(&(id.clone(), variant)).map(|doc| {
            relations.apply_to(doc);
            doc.updated_at = Utc::now();
            doc.clone()
        }))
    }

    async fn delete(&self, id: &DocumentId) -> Result<u64> {
        let mut state = self.state.write().await;
        let removed = [Variant::Draft, Variant::Published]
            .into_iter()
            .filter(|variant| state.documents.remove(&(id.clone(), *variant)).is_some())
            .count();
        Ok(removed as u64)
    }
}

#[async_trait]
impl ToggleStore for InMemoryStore {
    async fn find_toggle(&self, key: &ToggleKey) -> Result<Option<ToggleAction>> {
        Ok(self.state.read().await.toggles.get(key).cloned())
    }

    async fn insert_toggle(&self, action: &ToggleAction) -> Result<bool> {
        let mut state = self.state.write().await;
        let key = action.key();
        if state.toggles.contains_key(&key) {
            return Ok(false);
        }
        state.toggles.insert(key, action.clone());
        Ok(true)
    }

    async fn delete_toggle(&self, id: ToggleActionId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.toggles.len();
        state.toggles.retain(|_, action| action.id != id);
        Ok(state.toggles.len() < before)
    }

    async fn count_toggles(
        &self,
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
    ) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .toggles
            .values()
            .filter(|a| {
                a.target_type == target_type
                    && a.target_id == target_id
                    && a.action_type == action_type
            })
            .count() as i64)
    }

    async fn toggle_user_ids(
        &self,
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
    ) -> Result<Vec<MemberId>> {
        let state = self.state.read().await;
        let mut actions: Vec<&ToggleAction> = state
            .toggles
            .values()
            .filter(|a| {
                a.target_type == target_type
                    && a.target_id == target_id
                    && a.action_type == action_type
            })
            .collect();
        actions.sort_by_key(|a| a.created_at);
        Ok(actions.into_iter().map(|a| a.user_id).collect())
    }

    async fn toggles_for_user(
        &self,
        user_id: MemberId,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<Vec<ToggleAction>> {
        let state = self.state.read().await;
        Ok(state
            .toggles
            .values()
            .filter(|a| {
                a.user_id == user_id && a.target_type == target_type && a.target_id == target_id
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        if self.fail_notification_inserts.load(Ordering::SeqCst) {
            anyhow::bail!("notification insert rejected");
        }
        self.state
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn list_notifications(
        &self,
        recipient: MemberId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>> {
        let state = self.state.read().await;
        let mut rows: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(page(rows, Some(limit), Some(offset)))
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        recipient: MemberId,
    ) -> Result<Option<Notification>> {
        let mut state = self.state.write().await;
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient)
            .map(|n| {
                n.read = true;
                n.clone()
            }))
    }

    async fn unread_count(&self, recipient: MemberId) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient && !n.read)
            .count() as i64)
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn insert_report(&self, report: &Report) -> Result<()> {
        self.state.write().await.reports.push(report.clone());
        Ok(())
    }

    async fn find_report(&self, id: ReportId) -> Result<Option<Report>> {
        let state = self.state.read().await;
        Ok(state.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pending_report(
        &self,
        reported_by: MemberId,
        target_type: ReportTargetType,
        target_id: &DocumentId,
    ) -> Result<Option<Report>> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .iter()
            .find(|r| {
                r.reported_by == reported_by
                    && r.target_type == target_type
                    && &r.target_id == target_id
                    && r.is_pending()
            })
            .cloned())
    }

    async fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        let state = self.state.read().await;
        let mut reports: Vec<Report> = state
            .reports
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        reports.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(reports)
    }

    async fn mark_reviewed(
        &self,
        id: ReportId,
        reviewed_by: MemberId,
        review_note: Option<String>,
    ) -> Result<Option<Report>> {
        let mut state = self.state.write().await;
        Ok(state
            .reports
            .iter_mut()
            .find(|r| r.id == id && r.is_pending())
            .map(|r| {
                r.status = ReportStatus::Reviewed;
                r.reviewed_by = Some(reviewed_by);
                r.review_note = review_note;
                r.reviewed_at = Some(Utc::now());
                r.clone()
            }))
    }
}

#[async_trait]
impl BaseStoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
