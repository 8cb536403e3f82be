// Business domains
pub mod categories;
pub mod comments;
pub mod content;
pub mod members;
pub mod moderation;
pub mod notifications;
pub mod reports;
pub mod toggles;
