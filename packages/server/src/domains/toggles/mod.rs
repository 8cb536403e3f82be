//! Toggle ledger: presence of a row means the action is on.

pub mod actions;
pub mod models;
pub mod store;

pub use actions::{summary, toggle, ToggleRequest, ToggleResult, ToggleSummary};
pub use models::{ActionType, TargetType, ToggleAction, ToggleKey};
pub use store::ToggleStore;
