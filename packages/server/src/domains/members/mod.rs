//! Members: identity, roles, bans and strikes.

pub mod ban;
pub mod models;
pub mod store;

pub use ban::{check_ban, require_not_banned, BanStatus};
pub use models::{Member, MemberRole};
pub use store::MemberStore;
