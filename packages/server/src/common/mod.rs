// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod keyed_lock;
pub mod viewer;

pub use auth::{Actor, AuthError, Capability, HasAuthContext};
pub use entity_ids::{
    CategoryId, DocumentId, GrantId, MemberId, NotificationId, ReportId, ToggleActionId,
};
pub use error::{ForumError, ForumResult};
pub use id::Id;
pub use keyed_lock::KeyedLock;
pub use viewer::Viewer;
