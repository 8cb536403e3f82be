use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::kernel::BaseStoreHealth;
use crate::server::app::AppState;

const STORE_PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    store: StoreHealth,
    stream_topics: usize,
    fanout_in_flight: usize,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StoreHealth {
    fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    async fn check(store: &dyn BaseStoreHealth) -> Self {
        let error = match tokio::time::timeout(STORE_PING_TIMEOUT, store.ping()).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("ping failed: {e}")),
            Err(_) => Some(format!("ping timed out after {}s", STORE_PING_TIMEOUT.as_secs())),
        };
        Self {
            status: if error.is_none() { "ok" } else { "error" },
            error,
        }
    }
}

/// 200 while the store answers its ping, 503 otherwise. Stream and fan-out
/// figures are informational.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = StoreHealth::check(state.deps.store_health.as_ref()).await;
    let healthy = store.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        store,
        stream_topics: state.deps.stream_hub.topic_count().await,
        fanout_in_flight: state.deps.fanout.in_flight(),
    };
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl BaseStoreHealth for Unreachable {
        async fn ping(&self) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_failed_ping_marks_store_unhealthy() {
        let health = StoreHealth::check(&Unreachable).await;
        assert!(!health.is_ok());
        assert_eq!(health.status, "error");
        assert_eq!(health.error.as_deref(), Some("ping failed: connection refused"));
    }
}
