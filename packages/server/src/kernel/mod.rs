//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod memory;
pub mod metrics;
pub mod postgres;
pub mod search;
pub mod stream_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ForumStore, ServerDeps, DEFAULT_STRIKE_THRESHOLD};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use search::{HttpSearchIndexer, NoopSearchIndexer};
pub use stream_hub::{notification_topic, StreamHub};
pub use test_dependencies::{MockRealtimeChannel, MockSearchIndexer, PushedEvent, SearchCall};
pub use traits::*;
