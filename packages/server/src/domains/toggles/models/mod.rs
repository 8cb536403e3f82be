pub mod toggle_action;

pub use toggle_action::{ActionType, TargetType, ToggleAction, ToggleKey};
