use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{Document, DocumentFilter, FieldPatch, NewDocument, RelationSet, Variant};
use crate::common::DocumentId;

/// Persistence for document variants.
///
/// Every write targets exactly one variant. Keeping the draft and the
/// published row consistent is the job of [`super::sync`], not the store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, id: &DocumentId, variant: Variant) -> Result<Option<Document>>;

    async fn find_many(&self, filter: &DocumentFilter, variant: Variant) -> Result<Vec<Document>>;

    async fn count(&self, filter: &DocumentFilter, variant: Variant) -> Result<i64>;

    /// Creates the draft variant.
    async fn create(&self, data: &NewDocument) -> Result<Document>;

    /// Copies the draft into the published variant, inserting it if absent.
    /// Returns `None` when there is no draft.
    async fn publish(&self, id: &DocumentId, published_at: DateTime<Utc>)
        -> Result<Option<Document>>;

    /// Returns `None` when the variant does not exist.
    async fn update(
        &self,
        id: &DocumentId,
        variant: Variant,
        patch: &FieldPatch,
    ) -> Result<Option<Document>>;

    /// Returns `None` when the variant does not exist.
    async fn set_relations(
        &self,
        id: &DocumentId,
        variant: Variant,
        relations: &RelationSet,
    ) -> Result<Option<Document>>;

    /// Removes both variants. Returns the number of rows removed.
    async fn delete(&self, id: &DocumentId) -> Result<u64>;
}
