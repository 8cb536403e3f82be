use async_trait::async_trait;

use super::{AuthError, Capability};
use crate::common::entity_ids::{CategoryId, MemberId};

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// Actor::new(member_id, is_admin)
///     .can(Capability::ModerateCategories(categories))
///     .check(deps)
///     .await?;
/// ```
pub struct Actor {
    actor_id: MemberId,
    is_admin: bool,
}

impl Actor {
    pub fn new(actor_id: MemberId, is_admin: bool) -> Self {
        Self { actor_id, is_admin }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor_id: self.actor_id,
            is_admin: self.is_admin,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor_id: MemberId,
    is_admin: bool,
    capability: Capability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub async fn check<D>(self, deps: &D) -> Result<(), AuthError>
    where
        D: HasAuthContext + ?Sized,
    {
        check_permission(self.actor_id, self.is_admin, &self.capability, deps).await
    }
}

/// Dependencies that can answer moderator-grant questions
#[async_trait]
pub trait HasAuthContext: Send + Sync {
    /// True when `member` holds an active latest grant on at least one of
    /// `categories`.
    async fn is_active_moderator(
        &self,
        member: MemberId,
        categories: &[CategoryId],
    ) -> anyhow::Result<bool>;
}

async fn check_permission<D>(
    actor_id: MemberId,
    is_admin: bool,
    capability: &Capability,
    deps: &D,
) -> Result<(), AuthError>
where
    D: HasAuthContext + ?Sized,
{
    match capability {
        Capability::ReviewReports | Capability::ManageModerators => {
            if !is_admin {
                return Err(AuthError::AdminRequired);
            }
            Ok(())
        }
        Capability::ModerateCategories(categories) => {
            // Admins moderate through report review, not by default.
            if categories.is_empty() {
                return Err(AuthError::ModeratorRequired);
            }
            if deps.is_active_moderator(actor_id, categories).await? {
                Ok(())
            } else {
                Err(AuthError::ModeratorRequired)
            }
        }
        Capability::EditContent { owner } => {
            if *owner == Some(actor_id) {
                Ok(())
            } else {
                Err(AuthError::NotOwner)
            }
        }
        Capability::ManageContent { owner } => {
            if is_admin || *owner == Some(actor_id) {
                Ok(())
            } else {
                Err(AuthError::NotOwner)
            }
        }
    }
}
