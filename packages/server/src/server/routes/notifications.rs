use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{ForumResult, NotificationId, Viewer};
use crate::domains::notifications::{self, Notification};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Query(query): Query<ListQuery>,
) -> ForumResult<Json<Vec<Notification>>> {
    Ok(Json(
        notifications::list_notifications(&state.deps, &viewer, query.limit, query.offset)
            .await?,
    ))
}

pub async fn mark_read_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
    Path(id): Path<NotificationId>,
) -> ForumResult<Json<Notification>> {
    Ok(Json(
        notifications::mark_read(&state.deps, &viewer, id).await?,
    ))
}

#[derive(Serialize)]
pub struct UnreadCount {
    unread: i64,
}

pub async fn unread_count_handler(
    Extension(state): Extension<AppState>,
    viewer: Viewer,
) -> ForumResult<Json<UnreadCount>> {
    let unread = notifications::unread_count(&state.deps, &viewer).await?;
    Ok(Json(UnreadCount { unread }))
}
