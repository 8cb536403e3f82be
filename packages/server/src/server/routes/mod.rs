// HTTP routes
pub mod actions;
pub mod comments;
pub mod documents;
pub mod health;
pub mod moderation;
pub mod notifications;
pub mod reports;
pub mod stream;
