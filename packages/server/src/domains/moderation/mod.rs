//! Document moderation: `none`, `block-comment` and `delete`.

pub mod actions;
pub mod state;

pub use actions::{apply_moderation, moderate, ModerationResult};
pub use state::{ModerationAction, ModerationAuthority};
