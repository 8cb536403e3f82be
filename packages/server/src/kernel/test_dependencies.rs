// Test doubles for the infrastructure traits
//
// Each mock records its calls and can be switched into a failing mode so
// tests can assert that best-effort steps never fail the caller.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseRealtimeChannel, BaseSearchIndexer};
use crate::common::{DocumentId, MemberId};

// =============================================================================
// Mock Search Indexer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCall {
    Upsert(DocumentId),
    Remove(DocumentId),
}

#[derive(Clone, Default)]
pub struct MockSearchIndexer {
    calls: Arc<Mutex<Vec<SearchCall>>>,
    failing: Arc<AtomicBool>,
}

impl MockSearchIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mock = Self::new();
        mock.set_failing(true);
        mock
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all calls in order
    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_upserted(&self, id: &DocumentId) -> bool {
        self.calls().contains(&SearchCall::Upsert(id.clone()))
    }

    pub fn was_removed(&self, id: &DocumentId) -> bool {
        self.calls().contains(&SearchCall::Remove(id.clone()))
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl BaseSearchIndexer for MockSearchIndexer {
    async fn upsert(&self, document_id: &DocumentId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SearchCall::Upsert(document_id.clone()));
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mock search indexer unavailable");
        }
        Ok(())
    }

    async fn remove(&self, document_id: &DocumentId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SearchCall::Remove(document_id.clone()));
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mock search indexer unavailable");
        }
        Ok(())
    }
}

// =============================================================================
// Mock Realtime Channel
// =============================================================================

#[derive(Debug, Clone)]
pub struct PushedEvent {
    pub member_id: MemberId,
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Clone, Default)]
pub struct MockRealtimeChannel {
    pushed: Arc<Mutex<Vec<PushedEvent>>>,
    failing: Arc<AtomicBool>,
}

impl MockRealtimeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mock = Self::new();
        mock.set_failing(true);
        mock
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successfully pushed events
    pub fn pushed(&self) -> Vec<PushedEvent> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn pushed_to(&self, member_id: MemberId) -> Vec<PushedEvent> {
        self.pushed()
            .into_iter()
            .filter(|e| e.member_id == member_id)
            .collect()
    }
}

#[async_trait]
impl BaseRealtimeChannel for MockRealtimeChannel {
    async fn push_to_user(
        &self,
        member_id: MemberId,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mock realtime channel unavailable");
        }
        self.pushed.lock().unwrap().push(PushedEvent {
            member_id,
            event: event.to_string(),
            payload,
        });
        Ok(())
    }
}
