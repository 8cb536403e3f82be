use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};

use crate::common::{DocumentId, ForumResult, Viewer};
use crate::domains::comments::{self, CreateComment};
use crate::domains::content::Document;
use crate::server::app::AppState;

pub async fn create_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Json(input): Json<CreateComment>,
) -> ForumResult<(StatusCode, Json<Document>)> {
    let comment = comments::create_comment(&state.deps, &viewer, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn thread_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<DocumentId>,
) -> ForumResult<Json<Vec<Document>>> {
    Ok(Json(comments::thread(&state.deps, &id).await?))
}
