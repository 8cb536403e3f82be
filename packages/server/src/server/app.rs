//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::common::auth::JwtService;
use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    actions, comments, documents, health, moderation, notifications, reports, stream,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the Axum application router
pub fn build_app(
    deps: Arc<ServerDeps>,
    jwt_service: Arc<JwtService>,
    allowed_origins: &[String],
) -> Router {
    let app_state = AppState {
        deps,
        jwt_service: jwt_service.clone(),
    };

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/documents",
            post(documents::create_handler).get(documents::list_handler),
        )
        .route(
            "/documents/:id",
            get(documents::get_handler)
                .patch(documents::update_handler)
                .delete(documents::delete_handler),
        )
        .route("/documents/:id/publish", post(documents::publish_handler))
        .route("/documents/:id/comments", get(comments::thread_handler))
        .route("/comments", post(comments::create_handler))
        .route("/actions/toggle", post(actions::toggle_handler))
        .route("/actions/summary", get(actions::summary_handler))
        .route(
            "/moderation/documents/:id",
            get(moderation::document_handler),
        )
        .route("/moderation/:id/:action", post(moderation::moderate_handler))
        .route("/moderators", post(moderation::grant_handler))
        .route(
            "/reports",
            post(reports::submit_handler).get(reports::list_handler),
        )
        .route("/reports/:id/review", post(reports::review_handler))
        .route("/notifications", get(notifications::list_handler))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count_handler),
        )
        .route(
            "/notifications/:id/read",
            post(notifications::mark_read_handler),
        )
        .route("/api/streams/notifications", get(stream::stream_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
