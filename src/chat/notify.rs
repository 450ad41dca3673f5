use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::chat::conversation;
use crate::chat::events::Event;
use crate::groups::GroupRegistry;
use crate::users::{self, DirectoryError};

/// Push an out-of-band notification at `recipient`'s personal group.
///
/// Never fails upward: the conversation fan-out has already happened,
/// and a recipient we cannot resolve or reach simply gets no live
/// notification. The persisted message remains the durable record.
pub async fn notify(
    db_pool: &SqlitePool,
    registry: &GroupRegistry,
    recipient: &str,
    sender: &str,
    body: &str,
) {
    let user = match users::find_by_handle(db_pool, recipient).await {
        Ok(user) => user,
        Err(DirectoryError::NotFound) => {
            debug!(recipient, "dropping notification for unknown recipient");
            return;
        }
        Err(err) => {
            warn!(recipient, error = %err, "directory lookup failed, dropping notification");
            return;
        }
    };

    registry.dispatch(
        &conversation::notification_group(&user.id),
        &Event::Notification {
            message: body.to_owned(),
            sender: Some(sender.to_owned()),
        },
    );
}
