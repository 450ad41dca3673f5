use tower_sessions::Session;
use uuid::Uuid;

use crate::AppResult;

/// Session key under which the surrounding auth layer stores the
/// authenticated user's id before any of our handlers run.
pub const USER_ID: &str = "user_id";

pub async fn current_user_id(session: &Session) -> AppResult<Option<Uuid>> {
    let Some(raw) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };
    Ok(Uuid::parse_str(&raw).ok())
}
