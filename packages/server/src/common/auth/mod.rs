//! Authorization for forum operations
//!
//! ```ignore
//! use crate::common::auth::{Actor, Capability};
//!
//! Actor::new(actor_id, is_admin)
//!     .can(Capability::ReviewReports)
//!     .check(deps)
//!     .await?;
//! ```

mod builder;
mod capability;
mod errors;
pub mod jwt;

pub use builder::{Actor, CapabilityBuilder, HasAuthContext};
pub use capability::Capability;
pub use errors::AuthError;
pub use jwt::{Claims, JwtService};
