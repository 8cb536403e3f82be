use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::common::{ForumResult, ReportId, Viewer};
use crate::domains::reports::{self, Report, ReviewOutcome, ReviewReport, SubmitReport};
use crate::server::app::AppState;

pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Json(input): Json<SubmitReport>,
) -> ForumResult<(StatusCode, Json<Report>)> {
    let report = reports::submit_report(&state.deps, &viewer, input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Query(query): Query<ListQuery>,
) -> ForumResult<Json<Vec<Report>>> {
    Ok(Json(
        reports::list_reports(&state.deps, &viewer, query.status.as_deref()).await?,
    ))
}

pub async fn review_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Path(id): Path<ReportId>,
    Json(input): Json<ReviewReport>,
) -> ForumResult<Json<ReviewOutcome>> {
    Ok(Json(
        reports::review_report(&state.deps, &viewer, id, input).await?,
    ))
}
