//! User-submitted reports against posts and comments.

pub mod actions;
pub mod models;
pub mod store;

pub use actions::{list_reports, review_report, submit_report, ReviewOutcome, ReviewReport, SubmitReport};
pub use models::{Report, ReportStatus, ReportTargetType};
pub use store::ReportStore;
