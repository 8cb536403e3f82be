// Agora - forum backend core
//
// Posts, trades and comments stored as draft/published pairs, category
// moderation, toggle actions (like/follow/upvote/downvote), follow-graph
// notifications, reports and strikes.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
