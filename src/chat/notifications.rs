//! Notification listener session. Joins the caller's own personal group
//! and relays whatever the dispatcher pushes into it; inbound frames are
//! never treated as domain events.

use axum::debug_handler;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tower_sessions::Session;
use tracing::debug;
use uuid::Uuid;

use crate::chat::conversation;
use crate::chat::events::{Event, NotificationFrame};
use crate::groups::GroupRegistry;
use crate::{session, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn notifications_ws(
    State(registry): State<GroupRegistry>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user_id(&session).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    Ok(ws.on_upgrade(move |socket| listener_session(socket, registry, user_id)))
}

async fn listener_session(socket: WebSocket, registry: GroupRegistry, user_id: Uuid) {
    let group = conversation::notification_group(&user_id);
    let (conn, mut events) = registry.connect();
    let _membership = registry.join(&group, &conn);
    debug!(%group, "notification listener open");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let Event::Notification { message, sender } = event else { continue };
                let Ok(frame) = serde_json::to_string(&NotificationFrame {
                    message: &message,
                    sender: sender.as_deref(),
                }) else { continue };

                if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!(%group, "notification listener closed");
}
