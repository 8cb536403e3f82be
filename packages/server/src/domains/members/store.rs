use anyhow::Result;
use async_trait::async_trait;

use super::models::Member;
use crate::common::MemberId;

/// Persistence for members.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn insert_member(&self, member: &Member) -> Result<()>;

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>>;

    async fn find_members(&self, ids: &[MemberId]) -> Result<Vec<Member>>;

    /// Ids of every admin-role member.
    async fn admin_ids(&self) -> Result<Vec<MemberId>>;

    /// Writes `banned = false, banned_until = null, ban_reason = null`.
    async fn clear_ban(&self, id: MemberId) -> Result<()>;

    async fn set_strike_count(&self, id: MemberId, strike_count: i32) -> Result<()>;
}
