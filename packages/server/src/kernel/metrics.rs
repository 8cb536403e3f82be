//! Metric name constants.

use std::net::SocketAddr;

use anyhow::Context;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;

pub const SYNC_PUBLISHED_MISSING: &str = "agora.sync.published_missing"; // Counter.
pub const SYNC_PUBLISHED_FAILED: &str = "agora.sync.published_failed"; // Counter.

pub const FANOUT_NOTIFICATIONS: &str = "agora.fanout.notifications"; // Counter.
pub const FANOUT_FAILURES: &str = "agora.fanout.failures"; // Counter.

pub const REALTIME_PUSH_FAILURES: &str = "agora.realtime.push_failures"; // Counter.
pub const SEARCH_FAILURES: &str = "agora.search.failures"; // Counter.
pub const TOGGLE_CONFLICTS: &str = "agora.toggle.conflicts"; // Counter.

/// Must be run once on startup. Declares every instrument and, when an
/// address is given, serves a Prometheus scrape endpoint on it.
pub fn setup(listen: Option<SocketAddr>) -> anyhow::Result<()> {
    describe_counter!(
        SYNC_PUBLISHED_MISSING,
        "Mutations that found no published variant to mirror."
    );
    describe_counter!(
        SYNC_PUBLISHED_FAILED,
        "Published-variant writes that failed after the draft was written."
    );

    describe_counter!(FANOUT_NOTIFICATIONS, "Notifications persisted by fan-out.");
    describe_counter!(FANOUT_FAILURES, "Fan-out runs that failed.");

    describe_counter!(REALTIME_PUSH_FAILURES, "Failed realtime pushes.");
    describe_counter!(SEARCH_FAILURES, "Failed search index updates.");
    describe_counter!(
        TOGGLE_CONFLICTS,
        "Toggle inserts that lost a uniqueness race."
    );

    if let Some(addr) = listen {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install metrics exporter")?;
    }

    Ok(())
}
