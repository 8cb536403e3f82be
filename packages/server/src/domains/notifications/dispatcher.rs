//! Runs fan-out off the request path.
//!
//! In background mode each event is spawned on a [`TaskTracker`];
//! [`FanOutDispatcher::shutdown`] waits for those tasks so every
//! notification row is written before the process exits. Inline mode awaits
//! fan-out in place and is what tests use.

use std::str::FromStr;

use metrics::counter;
use tokio_util::task::TaskTracker;
use tracing::{debug, error};

use super::events::FanOutEvent;
use super::fanout::fan_out;
use crate::kernel::metrics::FANOUT_FAILURES;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutMode {
    Inline,
    Background,
}

impl FromStr for FanOutMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "background" => Ok(Self::Background),
            other => anyhow::bail!("unknown fan-out mode: {other}"),
        }
    }
}

#[derive(Clone)]
pub struct FanOutDispatcher {
    mode: FanOutMode,
    tracker: TaskTracker,
}

impl FanOutDispatcher {
    pub fn new(mode: FanOutMode) -> Self {
        Self {
            mode,
            tracker: TaskTracker::new(),
        }
    }

    pub fn inline() -> Self {
        Self::new(FanOutMode::Inline)
    }

    pub fn background() -> Self {
        Self::new(FanOutMode::Background)
    }

    pub fn mode(&self) -> FanOutMode {
        self.mode
    }

    /// Fan-outs still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Close the tracker and wait for in-flight fan-outs.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Hand `event` to fan-out. Never fails: errors are logged and counted.
pub async fn dispatch(deps: &ServerDeps, event: FanOutEvent) {
    match deps.fanout.mode {
        FanOutMode::Inline => run(deps, &event).await,
        FanOutMode::Background => {
            let tracker = deps.fanout.tracker.clone();
            let deps = deps.clone();
            tracker.spawn(async move { run(&deps, &event).await });
        }
    }
}

async fn run(deps: &ServerDeps, event: &FanOutEvent) {
    match fan_out(deps, event).await {
        Ok(persisted) => debug!(event = event.name(), persisted, "fan-out dispatched"),
        Err(e) => {
            counter!(FANOUT_FAILURES).increment(1);
            error!(event = event.name(), error = %e, "fan-out failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!("Inline".parse::<FanOutMode>().unwrap(), FanOutMode::Inline);
        assert_eq!(
            " background ".parse::<FanOutMode>().unwrap(),
            FanOutMode::Background
        );
        assert!("later".parse::<FanOutMode>().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_with_nothing_in_flight_returns() {
        let dispatcher = FanOutDispatcher::background();
        dispatcher.shutdown().await;
        assert_eq!(dispatcher.in_flight(), 0);
    }
}
