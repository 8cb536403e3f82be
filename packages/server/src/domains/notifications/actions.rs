use super::models::Notification;
use crate::common::{ForumError, ForumResult, NotificationId, Viewer};
use crate::kernel::ServerDeps;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// The viewer's notifications, newest first.
pub async fn list_notifications(
    deps: &ServerDeps,
    viewer: &Viewer,
    limit: Option<i64>,
    offset: Option<i64>,
) -> ForumResult<Vec<Notification>> {
    let member_id = viewer.require_auth()?;
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);

    Ok(deps
        .notifications
        .list_notifications(member_id, limit, offset)
        .await?)
}

/// Only the recipient may mark a notification read; anyone else gets
/// `NotFound`.
pub async fn mark_read(
    deps: &ServerDeps,
    viewer: &Viewer,
    id: NotificationId,
) -> ForumResult<Notification> {
    let member_id = viewer.require_auth()?;
    deps.notifications
        .mark_notification_read(id, member_id)
        .await?
        .ok_or_else(|| ForumError::not_found("notification"))
}

pub async fn unread_count(deps: &ServerDeps, viewer: &Viewer) -> ForumResult<i64> {
    let member_id = viewer.require_auth()?;
    Ok(deps.notifications.unread_count(member_id).await?)
}
