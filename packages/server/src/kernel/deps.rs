//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central service context passed to every action.
//! Stores and external services sit behind trait objects so tests can swap
//! in the in-memory store and mocks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::common::auth::HasAuthContext;
use crate::common::{CategoryId, KeyedLock, MemberId};
use crate::domains::categories::{self, CategoryStore};
use crate::domains::content::DocumentStore;
use crate::domains::members::MemberStore;
use crate::domains::notifications::{FanOutDispatcher, NotificationStore};
use crate::domains::reports::ReportStore;
use crate::domains::toggles::{ToggleKey, ToggleStore};
use crate::kernel::{BaseRealtimeChannel, BaseSearchIndexer, BaseStoreHealth, StreamHub};

/// Default strike count at which admins are alerted.
pub const DEFAULT_STRIKE_THRESHOLD: i32 = 3;

/// A single backend implementing every store trait.
pub trait ForumStore:
    MemberStore
    + CategoryStore
    + DocumentStore
    + ToggleStore
    + NotificationStore
    + ReportStore
    + BaseStoreHealth
    + 'static
{
}

impl<T> ForumStore for T where
    T: MemberStore
        + CategoryStore
        + DocumentStore
        + ToggleStore
        + NotificationStore
        + ReportStore
        + BaseStoreHealth
        + 'static
{
}

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub members: Arc<dyn MemberStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub toggles: Arc<dyn ToggleStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub reports: Arc<dyn ReportStore>,
    pub store_health: Arc<dyn BaseStoreHealth>,
    pub search: Arc<dyn BaseSearchIndexer>,
    /// Per-user push channel used by notification delivery
    pub realtime: Arc<dyn BaseRealtimeChannel>,
    /// In-process pub/sub hub backing the SSE endpoint
    pub stream_hub: StreamHub,
    pub fanout: FanOutDispatcher,
    /// Serializes toggles of the same ledger key within this process
    pub toggle_locks: Arc<KeyedLock<ToggleKey>>,
    pub strike_threshold: i32,
}

impl ServerDeps {
    pub fn new<S: ForumStore>(
        store: Arc<S>,
        search: Arc<dyn BaseSearchIndexer>,
        realtime: Arc<dyn BaseRealtimeChannel>,
        stream_hub: StreamHub,
        fanout: FanOutDispatcher,
    ) -> Self {
        Self {
            members: store.clone(),
            categories: store.clone(),
            documents: store.clone(),
            toggles: store.clone(),
            notifications: store.clone(),
            reports: store.clone(),
            store_health: store,
            search,
            realtime,
            stream_hub,
            fanout,
            toggle_locks: Arc::new(KeyedLock::new()),
            strike_threshold: DEFAULT_STRIKE_THRESHOLD,
        }
    }

    pub fn with_strike_threshold(mut self, threshold: i32) -> Self {
        self.strike_threshold = threshold;
        self
    }
}

/// Moderator checks read the latest grant rows
#[async_trait]
impl HasAuthContext for ServerDeps {
    async fn is_active_moderator(
        &self,
        member: MemberId,
        categories: &[CategoryId],
    ) -> anyhow::Result<bool> {
        categories::is_active_moderator(self, member, categories).await
    }
}
