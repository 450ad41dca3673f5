pub mod chat;
pub mod db;
pub mod groups;
pub mod session;
pub mod store;
pub mod users;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, Router};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

use crate::groups::GroupRegistry;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub registry: GroupRegistry,
}

/// Application router. The caller applies the session layer so every
/// route ends up behind the same session store.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/ws", chat::ws_router())
        .nest("/messages", chat::message_router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub type AppResult<T> = Result<T, AppError>;
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}\n\n{}", self.0, self.0.backtrace()),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
