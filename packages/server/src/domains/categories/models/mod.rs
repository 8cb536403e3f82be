pub mod category;
pub mod moderator_grant;

pub use category::Category;
pub use moderator_grant::{latest_per_category, GrantStatus, ModeratorGrant};
