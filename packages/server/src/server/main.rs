// Main entry point for API server

use std::sync::Arc;
use std::time::Duration;

use agora_core::common::auth::JwtService;
use agora_core::domains::notifications::FanOutDispatcher;
use agora_core::kernel::{
    metrics, BaseSearchIndexer, HttpSearchIndexer, NoopSearchIndexer, PgStore, ServerDeps,
    StreamHub,
};
use agora_core::{server::build_app, Config};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agora_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Agora API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(fanout_mode = ?config.fanout_mode, "Configuration loaded");

    metrics::setup(config.metrics_addr).context("Failed to install metrics exporter")?;

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let search: Arc<dyn BaseSearchIndexer> = match &config.search_index_url {
        Some(url) => Arc::new(HttpSearchIndexer::new(url.clone())),
        None => {
            tracing::info!("SEARCH_INDEX_URL not set, search indexing disabled");
            Arc::new(NoopSearchIndexer)
        }
    };

    let stream_hub = StreamHub::new();
    let fanout = FanOutDispatcher::new(config.fanout_mode);
    let deps = Arc::new(
        ServerDeps::new(
            Arc::new(PgStore::new(pool)),
            search,
            Arc::new(stream_hub.clone()),
            stream_hub.clone(),
            fanout.clone(),
        )
        .with_strike_threshold(config.strike_threshold),
    );

    // Drop SSE topics nobody listens to anymore
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            stream_hub.cleanup().await;
        }
    });

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));
    let app = build_app(deps, jwt_service, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!(in_flight = fanout.in_flight(), "Waiting for notification fan-out");
    fanout.shutdown().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
