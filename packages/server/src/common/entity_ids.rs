//! Typed ID aliases for every entity the forum persists.
//!
//! Logical documents are the exception: their stable identity is a
//! [`DocumentId`] string shared by the draft and published rows.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use super::id::Id;

/// Marker type for members (users).
pub struct Member;

/// Marker type for categories.
pub struct Category;

/// Marker type for category moderator grants.
pub struct ModeratorGrant;

/// Marker type for toggle-ledger rows.
pub struct ToggleAction;

/// Marker type for notifications.
pub struct Notification;

/// Marker type for content reports.
pub struct Report;

pub type MemberId = Id<Member>;
pub type CategoryId = Id<Category>;
pub type GrantId = Id<ModeratorGrant>;
pub type ToggleActionId = Id<ToggleAction>;
pub type NotificationId = Id<Notification>;
pub type ReportId = Id<Report>;

/// Stable identity of a logical document, shared by its draft and
/// published variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a new random document id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().simple().to_string())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
