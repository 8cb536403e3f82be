//! Moderator endpoints.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};

use crate::common::{DocumentId, ForumError, ForumResult, Viewer};
use crate::domains::categories::{self, GrantModerator, ModeratorGrant};
use crate::domains::content::{self, Document};
use crate::domains::moderation::{self, ModerationAction, ModerationResult};
use crate::server::app::AppState;

/// Owner/moderator view, including hidden and unpublished documents.
pub async fn document_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Path(id): Path<DocumentId>,
) -> ForumResult<Json<Document>> {
    Ok(Json(content::fetch_for_viewer(&state.deps, &viewer, &id).await?))
}

pub async fn moderate_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Path((id, action)): Path<(DocumentId, String)>,
) -> ForumResult<Json<ModerationResult>> {
    let action: ModerationAction = action
        .parse()
        .map_err(|e: anyhow::Error| ForumError::bad_request(e.to_string()))?;
    Ok(Json(
        moderation::moderate(&state.deps, &viewer, &id, action).await?,
    ))
}

pub async fn grant_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Json(input): Json<GrantModerator>,
) -> ForumResult<(StatusCode, Json<ModeratorGrant>)> {
    let grant = categories::grant_moderator(&state.deps, &viewer, input).await?;
    Ok((StatusCode::CREATED, Json(grant)))
}
