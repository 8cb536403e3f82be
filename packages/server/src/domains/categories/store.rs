use anyhow::Result;
use async_trait::async_trait;

use super::models::{Category, ModeratorGrant};
use crate::common::{CategoryId, MemberId};

/// Persistence for categories and their moderator grants.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert_category(&self, category: &Category) -> Result<()>;

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>>;

    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Appends a grant row; history is never rewritten.
    async fn insert_grant(&self, grant: &ModeratorGrant) -> Result<()>;

    /// The latest grant for `member` in each of `categories` that has any.
    async fn latest_grants(
        &self,
        member: MemberId,
        categories: &[CategoryId],
    ) -> Result<Vec<ModeratorGrant>>;
}
