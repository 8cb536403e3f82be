//! Categories and the moderators that act on them.

pub mod actions;
pub mod models;
pub mod store;

pub use actions::{grant_moderator, is_active_moderator, GrantModerator};
pub use models::{Category, GrantStatus, ModeratorGrant};
pub use store::CategoryStore;
