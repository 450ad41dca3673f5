pub mod conversation;
pub mod events;
mod http;
mod notifications;
pub mod notify;
mod pm;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn ws_router() -> Router<AppState> {
    Router::new()
        .route("/pm/{username}", get(pm::pm_ws))
        .route("/notifications", get(notifications::notifications_ws))
}

pub fn message_router() -> Router<AppState> {
    Router::new()
        .route("/{username}", get(http::conversation))
        .route("/{username}/send", post(http::send_message))
}
