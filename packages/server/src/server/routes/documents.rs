//! Post and trade endpoints.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};

use crate::common::{DocumentId, ForumResult, Viewer};
use crate::domains::content::{
    self, CreateDocument, Document, ListDocuments, UpdateDocument,
};
use crate::server::app::AppState;

pub async fn create_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Json(input): Json<CreateDocument>,
) -> ForumResult<(StatusCode, Json<Document>)> {
    let doc = content::create_document(&state.deps, &viewer, input).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListDocuments>,
) -> ForumResult<Json<Vec<Document>>> {
    Ok(Json(content::list_published(&state.deps, query).await?))
}

pub async fn get_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<DocumentId>,
) -> ForumResult<Json<Document>> {
    Ok(Json(content::fetch_public_document(&state.deps, &id).await?))
}

pub async fn update_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Path(id): Path<DocumentId>,
    Json(input): Json<UpdateDocument>,
) -> ForumResult<Json<Document>> {
    Ok(Json(
        content::update_document(&state.deps, &viewer, &id, input).await?,
    ))
}

pub async fn publish_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Path(id): Path<DocumentId>,
) -> ForumResult<Json<Document>> {
    Ok(Json(
        content::publish_document(&state.deps, &viewer, &id).await?,
    ))
}

pub async fn delete_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Path(id): Path<DocumentId>,
) -> ForumResult<StatusCode> {
    content::delete_document(&state.deps, &viewer, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
