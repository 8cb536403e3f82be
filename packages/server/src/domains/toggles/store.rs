use anyhow::Result;
use async_trait::async_trait;

use super::models::{ActionType, TargetType, ToggleAction, ToggleKey};
use crate::common::{MemberId, ToggleActionId};

/// Persistence for the toggle ledger.
#[async_trait]
pub trait ToggleStore: Send + Sync {
    async fn find_toggle(&self, key: &ToggleKey) -> Result<Option<ToggleAction>>;

    /// Returns `false` if a row with the same key already exists.
    async fn insert_toggle(&self, action: &ToggleAction) -> Result<bool>;

    async fn delete_toggle(&self, id: ToggleActionId) -> Result<bool>;

    /// Fresh aggregate over the ledger; never cached.
    async fn count_toggles(
        &self,
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
    ) -> Result<i64>;

    async fn toggle_user_ids(
        &self,
        target_type: TargetType,
        target_id: &str,
        action_type: ActionType,
    ) -> Result<Vec<MemberId>>;

    /// Every action `user_id` holds on one target.
    async fn toggles_for_user(
        &self,
        user_id: MemberId,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<Vec<ToggleAction>>;
}
