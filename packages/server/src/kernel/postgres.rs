//! Postgres-backed store. Each trait method delegates to the sqlx queries on
//! the corresponding model type.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::BaseStoreHealth;
use crate::common::{CategoryId, DocumentId, MemberId, NotificationId, ReportId, ToggleActionId};
use crate::domains::categories::{Category, CategoryStore, ModeratorGrant};
use crate::domains::content::{
    Document, DocumentFilter, DocumentStore, FieldPatch, NewDocument, RelationSet, Variant,
};
use crate::domains::members::{Member, MemberStore};
use crate::domains::notifications::{Notification, NotificationStore};
use crate::domains::reports::{Report, ReportStatus, ReportStore, ReportTargetType};
use crate::domains::toggles::{ActionType, TargetType, ToggleAction, ToggleKey, ToggleStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MemberStore for PgStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        member.insert(&self.pool).await
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Member::find_by_id(id, &self.pool).await
    }

    async fn find_members(&self, ids: &[MemberId]) -> Result<Vec<Member>> {
        Member::find_by_ids(ids, &self.pool).await
    }

    async fn admin_ids(&self) -> Result<Vec<MemberId>> {
        Member::find_admin_ids(&self.pool).await
    }

    async fn clear_ban(&self, id: MemberId) -> Result<()> {
        Member::clear_ban(id, &self.pool).await
    }

    async fn set_strike_count(&self, id: MemberId, strike_count: i32) -> Result<()> {
        Member::update_strike_count(id, strike_count, &self.pool).await
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn insert_category(&self, category: &Category) -> Result<()> {
        category.insert(&self.pool).await
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Category::find_by_id(id, &self.pool).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Category::find_all(&self.pool).await
    }

    async fn insert_grant(&self, grant: &ModeratorGrant) -> Result<()> {
        grant.insert(&self.pool).await
    }

    async fn latest_grants(
        &self,
        member: MemberId,
        categories: &[CategoryId],
    ) -> Result<Vec<ModeratorGrant>> {
        ModeratorGrant::find_latest_for_member(member, categories, &self.pool).await
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_one(&self, id: &DocumentId, variant: Variant) -> Result<Option<Document>> {
        Document::find_one(id, variant, &self.pool).await
    }

    async fn find_many(&self, filter: &DocumentFilter, variant: Variant) -> Result<Vec<Document>> {
        Document::find_many(filter, variant, &self.pool).await
    }

    async fn count(&self, filter: &DocumentFilter, variant: Variant) -> Result<i64> {
        Document::count(filter, variant, &self.pool).await
    }

    async fn create(&self, data: &NewDocument) -> Result<Document> {
        Document::create_draft(data, &self.pool).await
    }

    async fn publish(
        &self,
        id: &DocumentId,
        published_at: DateTime<Utc>,
    ) -> Result<Option<Document>> {
        Document::publish_from_draft(id, published_at, &self.pool).await
    }

    async fn update(
        &self,
        id: &DocumentId,
        variant: Variant,
        patch: &FieldPatch,
    ) -> Result<Option<Document>> {
        Document::update_fields(id, variant, patch, &self.pool).await
    }

    async fn set_relations(
        &self,
        id: &DocumentId,
        variant: Variant,
        relations: &RelationSet,
    ) -> Result<Option<Document>> {
        Document::update_relations(id, variant, relations, &self.pool).await
    }

    async fn delete(&self, id: &DocumentId) -> Result<u64> {
        Document::delete_all_variants(id, &self.pool).await
    }
}

#[async_trait]
impl ToggleStore for PgStore {
    async fn find_toggle(&self, key: &ToggleKey) -> Result<Option<ToggleAction>> {
        ToggleAction::find_by_key(key, &self.pool).await
    }

    async fn insert_toggle(&self, action: &ToggleAction) -> Result<bool> {
        action.insert_if_absent(&self.pool).await
    }

    async fn delete_toggle(&self, id: ToggleActionId) -> Result<bool> {
        ToggleAction::delete_by_id(id, &self.pool).await
    }

    async fn count_toggles(
        &self,
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
    ) -> Result<i64> {
        ToggleAction::count_for_target(target_type, target_id, action_type, &self.pool).await
    }

    async fn toggle_user_ids(
        &self,
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
    ) -> Result<Vec<MemberId>> {
        ToggleAction::find_user_ids(target_type, target_id, action_type, &self.pool).await
    }

    async fn toggles_for_user(
        &self,
        user_id: MemberId,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<Vec<ToggleAction>> {
        ToggleAction::find_for_user_on_target(user_id, target_type, target_id, &self.pool).await
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        notification.insert(&self.pool).await
    }

    async fn list_notifications(
        &self,
        recipient: MemberId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>> {
        Notification::find_for_recipient(recipient, limit, offset, &self.pool).await
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        recipient: MemberId,
    ) -> Result<Option<Notification>> {
        Notification::mark_read(id, recipient, &self.pool).await
    }

    async fn unread_count(&self, recipient: MemberId) -> Result<i64> {
        Notification::count_unread(recipient, &self.pool).await
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn insert_report(&self, report: &Report) -> Result<()> {
        report.insert(&self.pool).await
    }

    async fn find_report(&self, id: ReportId) -> Result<Option<Report>> {
        Report::find_by_id(id, &self.pool).await
    }

    async fn find_pending_report(
        &self,
        reported_by: MemberId,
        target_type: ReportTargetType,
        target_id: &DocumentId,
    ) -> Result<Option<Report>> {
        Report::find_pending_by_reporter(reported_by, target_type, target_id, &self.pool).await
    }

    async fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        Report::find_all(status, &self.pool).await
    }

    async fn mark_reviewed(
        &self,
        id: ReportId,
        reviewed_by: MemberId,
        review_note: Option<String>,
    ) -> Result<Option<Report>> {
        Report::mark_reviewed(id, reviewed_by, review_note, &self.pool).await
    }
}

#[async_trait]
impl BaseStoreHealth for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
