//! HTTP side door for private messages: the page-rendering layer posts
//! through here. Writes go through the same store as the websocket path
//! so history stays consistent however a message arrived.

use axum::debug_handler;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::users::{self, DirectoryError, UserRecord};
use crate::{session, store, AppResult};

#[derive(Deserialize)]
pub(crate) struct SendMessageForm {
    body: String,
}

async fn identify(
    db_pool: &SqlitePool,
    session: &Session,
    peer_handle: &str,
) -> AppResult<Result<(UserRecord, UserRecord), Response>> {
    let Some(user_id) = session::current_user_id(session).await? else {
        return Ok(Err(StatusCode::UNAUTHORIZED.into_response()));
    };

    let me = match users::find_by_id(db_pool, &user_id).await {
        Ok(user) => user,
        Err(DirectoryError::NotFound) => return Ok(Err(StatusCode::UNAUTHORIZED.into_response())),
        Err(err) => return Err(err.into()),
    };

    let peer = match users::find_by_handle(db_pool, peer_handle).await {
        Ok(user) => user,
        Err(DirectoryError::NotFound) => return Ok(Err(StatusCode::NOT_FOUND.into_response())),
        Err(err) => return Err(err.into()),
    };

    Ok(Ok((me, peer)))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send_message(
    Path(peer_handle): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(SendMessageForm { body }): Form<SendMessageForm>,
) -> AppResult<Response> {
    let (me, peer) = match identify(&db_pool, &session, &peer_handle).await? {
        Ok(pair) => pair,
        Err(response) => return Ok(response),
    };

    let body = body.trim();
    if body.is_empty() {
        return Ok(Json(json!({ "ok": false })).into_response());
    }

    let saved = store::save_private_message(&db_pool, &me.id, &peer.id, body).await?;

    Ok(Json(json!({
        "ok": true,
        "id": saved.id,
        "body": saved.body,
        "sender": me.handle,
        "created": saved.created,
    }))
    .into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn conversation(
    Path(peer_handle): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let (me, peer) = match identify(&db_pool, &session, &peer_handle).await? {
        Ok(pair) => pair,
        Err(response) => return Ok(response),
    };

    // Own handle shows the (empty) inbox placeholder.
    if peer.id == me.id {
        return Ok(Json(Vec::<store::PrivateMessage>::new()).into_response());
    }

    // Fetching the history is the read acknowledgement.
    store::mark_conversation_read(&db_pool, &me.id, &peer.id).await?;
    let messages = store::list_conversation(&db_pool, &me.id, &peer.id).await?;

    Ok(Json(messages).into_response())
}
