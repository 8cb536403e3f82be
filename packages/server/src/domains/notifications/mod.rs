//! Notifications: follow-graph fan-out, persistence and delivery.

pub mod actions;
pub mod dispatcher;
pub mod events;
pub mod fanout;
pub mod models;
pub mod recipients;
pub mod store;

pub use actions::{list_notifications, mark_read, unread_count};
pub use dispatcher::{dispatch, FanOutDispatcher, FanOutMode};
pub use events::{DisplayNames, FanOutEvent, RenderedNotification};
pub use fanout::{fan_out, NOTIFICATION_EVENT};
pub use models::{Notification, NotificationType};
pub use recipients::{resolve_recipients, RecipientSet};
pub use store::NotificationStore;
