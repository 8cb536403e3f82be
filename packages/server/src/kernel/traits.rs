// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Forum rules live in domain functions that call through these traits.
//
// Naming convention: Base* for trait names (e.g., BaseSearchIndexer)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{DocumentId, MemberId};

// =============================================================================
// Search Indexer Trait (Infrastructure - external full-text index)
// =============================================================================

#[async_trait]
pub trait BaseSearchIndexer: Send + Sync {
    /// Add or refresh a document in the index
    async fn upsert(&self, document_id: &DocumentId) -> Result<()>;

    /// Drop a document from the index
    async fn remove(&self, document_id: &DocumentId) -> Result<()>;
}

// =============================================================================
// Realtime Channel Trait (Infrastructure - push to connected clients)
// =============================================================================

#[async_trait]
pub trait BaseRealtimeChannel: Send + Sync {
    /// Push an event to every open connection of a member. No acknowledgment.
    async fn push_to_user(
        &self,
        member_id: MemberId,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<()>;
}

// =============================================================================
// Store Health Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseStoreHealth: Send + Sync {
    /// Cheap round trip to the backing store
    async fn ping(&self) -> Result<()>;
}
