//! Private chat connection session. One task per open socket; the task
//! joins the pair's conversation group for its whole lifetime and
//! processes inbound frames strictly in arrival order.

use axum::debug_handler;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::chat::events::{ChatFrame, Event, InboundChat};
use crate::chat::{conversation, notify};
use crate::groups::GroupRegistry;
use crate::users::{self, DirectoryError, UserRecord};
use crate::{session, store, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn pm_ws(
    Path(peer_handle): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(registry): State<GroupRegistry>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user_id(&session).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    let me = match users::find_by_id(&db_pool, &user_id).await {
        Ok(user) => user,
        Err(DirectoryError::NotFound) => return Ok(StatusCode::UNAUTHORIZED.into_response()),
        Err(err) => return Err(err.into()),
    };

    // The store needs a resolved recipient before any frame can be
    // accepted, so an unknown peer is rejected at the handshake.
    let peer = match users::find_by_handle(&db_pool, &peer_handle).await {
        Ok(user) => user,
        Err(DirectoryError::NotFound) => return Ok(StatusCode::NOT_FOUND.into_response()),
        Err(err) => return Err(err.into()),
    };

    let group = conversation::conversation_group(&me.handle, &peer.handle);
    Ok(ws.on_upgrade(move |socket| chat_session(socket, db_pool, registry, group, me, peer)))
}

async fn chat_session(
    socket: WebSocket,
    db_pool: SqlitePool,
    registry: GroupRegistry,
    group: String,
    me: UserRecord,
    peer: UserRecord,
) {
    let (conn, mut events) = registry.connect();
    let _membership = registry.join(&group, &conn);
    debug!(user = %me.handle, %group, "private chat session open");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                // Only chat events belong on a conversation socket.
                let Event::Chat { message, sender } = event else { continue };
                let Ok(frame) = serde_json::to_string(&ChatFrame {
                    message: &message,
                    sender: &sender,
                }) else { continue };

                if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        receive(&db_pool, &registry, &group, &me, &peer, text.as_str()).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!(user = %me.handle, %group, "private chat session closed");
    // Membership guard drops here, leaving the conversation group.
}

async fn receive(
    db_pool: &SqlitePool,
    registry: &GroupRegistry,
    group: &str,
    me: &UserRecord,
    peer: &UserRecord,
    text: &str,
) {
    let Ok(inbound) = serde_json::from_str::<InboundChat>(text) else {
        return;
    };

    let body = inbound.message.trim();
    if body.is_empty() {
        // Blank input is a silent no-op.
        return;
    }

    // Durability first: peers must never see a message that was not
    // stored.
    let saved = match store::save_private_message(db_pool, &me.id, &peer.id, body).await {
        Ok(saved) => saved,
        Err(err) => {
            warn!(error = %err, "dropping frame, message store unavailable");
            return;
        }
    };

    registry.send(group, &Event::Chat {
        message: saved.body.clone(),
        sender: me.handle.clone(),
    });

    if peer.id != me.id {
        notify::notify(db_pool, registry, &peer.handle, &me.handle, &saved.body).await;
    }
}
