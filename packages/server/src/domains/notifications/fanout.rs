//! Notification fan-out: one persisted row per recipient, then a
//! best-effort realtime push.

use anyhow::Result;
use metrics::counter;
use tracing::{debug, warn};

use super::events::{DisplayNames, FanOutEvent};
use super::models::Notification;
use super::recipients::resolve_recipients;
use crate::kernel::metrics::{FANOUT_NOTIFICATIONS, REALTIME_PUSH_FAILURES};
use crate::kernel::ServerDeps;

/// Realtime event name for a newly persisted notification.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Deliver `event` to every resolved recipient. Returns how many
/// notifications were persisted.
///
/// A failed insert for one recipient is logged and skipped so the others
/// still get theirs. A failed push never touches the persisted row.
pub async fn fan_out(deps: &ServerDeps, event: &FanOutEvent) -> Result<usize> {
    let recipients = resolve_recipients(deps, event).await?;
    if recipients.is_empty() {
        debug!(event = event.name(), "no recipients");
        return Ok(0);
    }

    let members = deps.members.find_members(&event.named_members()).await?;
    let names = DisplayNames::new(members.into_iter().map(|m| (m.id, m.display_name)));
    let rendered = event.render(&names);

    let mut persisted = 0;
    for recipient in recipients.into_vec() {
        let notification = Notification::new(
            recipient,
            rendered.kind,
            rendered.message.clone(),
            rendered.data.clone(),
        );

        if let Err(e) = deps.notifications.insert_notification(&notification).await {
            warn!(
                event = event.name(),
                recipient = %recipient,
                error = %e,
                "failed to persist notification"
            );
            continue;
        }
        persisted += 1;
        counter!(FANOUT_NOTIFICATIONS).increment(1);

        let payload = serde_json::to_value(&notification)?;
        if let Err(e) = deps
            .realtime
            .push_to_user(recipient, NOTIFICATION_EVENT, payload)
            .await
        {
            counter!(REALTIME_PUSH_FAILURES).increment(1);
            warn!(recipient = %recipient, error = %e, "realtime push failed");
        }
    }

    debug!(event = event.name(), persisted, "fan-out complete");
    Ok(persisted)
}
