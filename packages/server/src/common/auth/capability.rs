use crate::common::entity_ids::{CategoryId, MemberId};

/// What an actor is trying to do.
///
/// Admin status is taken from the verified token; moderator status is looked
/// up per category at check time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Change the moderation status of content attached to any of these
    /// categories. Requires an active grant on at least one of them.
    ModerateCategories(Vec<CategoryId>),

    /// Review reports (and moderate through the review path)
    ReviewReports,

    /// Append moderator grants
    ManageModerators,

    /// Edit content body and relations. Author only.
    EditContent { owner: Option<MemberId> },

    /// Publish or delete content. Author or admin.
    ManageContent { owner: Option<MemberId> },
}
