//! Test harness for integration testing.
//!
//! `TestHarness` wires the real domain actions to the in-memory store and
//! recording mocks, with fan-out running inline so notifications are
//! observable as soon as the triggering action returns.
//!
//! `PgHarness` runs the Postgres store against a shared testcontainers
//! instance. Tests using it are `#[ignore]`d; run them with
//! `cargo test -- --ignored` when Docker is available.

use std::sync::Arc;

use agora_core::common::auth::JwtService;
use agora_core::common::{MemberId, Viewer};
use agora_core::domains::notifications::{FanOutDispatcher, Notification};
use agora_core::kernel::{
    InMemoryStore, MockRealtimeChannel, MockSearchIndexer, PgStore, ServerDeps, StreamHub,
};
use agora_core::server::build_app;
use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret";
pub const JWT_ISSUER: &str = "agora-test";

/// Domain-level harness backed by the in-memory store.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut TestHarness) {
///     let alice = ctx.member("alice").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub deps: Arc<ServerDeps>,
    pub store: Arc<InMemoryStore>,
    pub search: MockSearchIndexer,
    pub realtime: MockRealtimeChannel,
    pub jwt_service: Arc<JwtService>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        self.deps.fanout.shutdown().await;
    }
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();

        let store = Arc::new(InMemoryStore::new());
        let search = MockSearchIndexer::new();
        let realtime = MockRealtimeChannel::new();
        let deps = ServerDeps::new(
            store.clone(),
            Arc::new(search.clone()),
            Arc::new(realtime.clone()),
            StreamHub::new(),
            FanOutDispatcher::inline(),
        );

        Self {
            deps: Arc::new(deps),
            store,
            search,
            realtime,
            jwt_service: Arc::new(JwtService::new(JWT_SECRET, JWT_ISSUER.to_string())),
        }
    }

    /// Replace the strike threshold for the remainder of the test.
    pub fn with_strike_threshold(mut self, threshold: i32) -> Self {
        let deps = (*self.deps).clone().with_strike_threshold(threshold);
        self.deps = Arc::new(deps);
        self
    }

    pub fn app(&self) -> Router {
        build_app(self.deps.clone(), self.jwt_service.clone(), &[])
    }

    pub fn token(&self, viewer: &Viewer) -> String {
        let member_id = viewer.member_id.expect("token requires a member");
        self.jwt_service
            .create_token(member_id.into_uuid(), viewer.is_admin)
            .expect("Failed to create test token")
    }

    /// Send a JSON request through the router; returns status and parsed body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        viewer: Option<&Viewer>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(viewer) = viewer {
            builder = builder.header("authorization", format!("Bearer {}", self.token(viewer)));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .app()
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, value)
    }

    pub async fn notifications_for(&self, member: MemberId) -> Vec<Notification> {
        self.deps
            .notifications
            .list_notifications(member, 100, 0)
            .await
            .expect("Failed to list notifications")
    }
}

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared Postgres container, started once and reused by every test.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Postgres-backed harness sharing one container across tests.
pub struct PgHarness {
    pub pool: PgPool,
    pub store: PgStore,
}

impl PgHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;
        let pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;
        Ok(Self {
            store: PgStore::new(pool.clone()),
            pool,
        })
    }
}
