//! Request-scoped identity of whoever is calling.

use super::entity_ids::MemberId;
use super::error::{ForumError, ForumResult};

/// The caller of a domain action.
///
/// Built from the verified JWT by the HTTP layer; tests construct it directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewer {
    /// The authenticated member, if any.
    pub member_id: Option<MemberId>,
    /// Whether the member holds the admin role.
    pub is_admin: bool,
}

impl Viewer {
    pub fn authenticated(member_id: MemberId, is_admin: bool) -> Self {
        Self {
            member_id: Some(member_id),
            is_admin,
        }
    }

    pub fn member(member_id: MemberId) -> Self {
        Self::authenticated(member_id, false)
    }

    pub fn admin(member_id: MemberId) -> Self {
        Self::authenticated(member_id, true)
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.member_id.is_some()
    }

    /// Returns false for unauthenticated callers.
    pub fn is_admin(&self) -> bool {
        self.member_id.is_some() && self.is_admin
    }

    /// Require a session; returns the member id.
    pub fn require_auth(&self) -> ForumResult<MemberId> {
        self.member_id.ok_or(ForumError::Unauthenticated)
    }

    /// Require an admin session.
    pub fn require_admin(&self) -> ForumResult<MemberId> {
        let member_id = self.require_auth()?;
        if !self.is_admin {
            return Err(ForumError::forbidden("Admin access required"));
        }
        Ok(member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_viewer_is_unauthenticated() {
        let viewer = Viewer::anonymous();
        assert!(!viewer.is_admin());
        assert!(matches!(viewer.require_auth(), Err(ForumError::Unauthenticated)));
        assert!(matches!(viewer.require_admin(), Err(ForumError::Unauthenticated)));
    }

    #[test]
    fn test_member_is_not_admin() {
        let viewer = Viewer::member(MemberId::new());
        assert!(viewer.require_auth().is_ok());
        assert!(matches!(viewer.require_admin(), Err(ForumError::Forbidden(_))));
    }
}
