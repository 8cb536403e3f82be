//! Toggle ledger endpoints.

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;

use crate::common::{ForumResult, Viewer};
use crate::domains::toggles::{self, ToggleRequest, ToggleResult, ToggleSummary};
use crate::server::app::AppState;

pub async fn toggle_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Json(input): Json<ToggleRequest>,
) -> ForumResult<Json<ToggleResult>> {
    Ok(Json(toggles::toggle(&state.deps, &viewer, input).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    /// Defaults to `post`.
    target_type: Option<String>,
    target_id: String,
}

pub async fn summary_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Query(query): Query<SummaryQuery>,
) -> ForumResult<Json<ToggleSummary>> {
    let target_type = query.target_type.as_deref().unwrap_or("post");
    Ok(Json(
        toggles::summary(&state.deps, &viewer, target_type, &query.target_id).await?,
    ))
}
