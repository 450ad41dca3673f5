//! Durable message persistence. The store is the source of truth for a
//! conversation; live fan-out only ever happens after a successful save.

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// A persisted private message. Immutable once written except for the
/// `read` flag.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PrivateMessage {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub body: String,
    pub read: bool,
    pub created: i64,
}

/// A message scoped to a named room rather than a user pair.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub room_name: String,
    pub body: String,
    pub created: i64,
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Persist one private message, assigning its id and timestamp. The v7
/// uuid is time-ordered, so `(created, id)` totally orders a
/// conversation even across same-millisecond saves.
pub async fn save_private_message(
    db_pool: &SqlitePool,
    sender_id: &Uuid,
    recipient_id: &Uuid,
    body: &str,
) -> Result<PrivateMessage, StoreError> {
    let id = Uuid::now_v7();
    let created = now_millis();

    sqlx::query(
        "INSERT INTO private_messages (id,sender_id,recipient_id,body,read,created) VALUES (?,?,?,?,0,?)",
    )
    .bind(id.to_string())
    .bind(sender_id.to_string())
    .bind(recipient_id.to_string())
    .bind(body)
    .bind(created)
    .execute(db_pool)
    .await?;

    Ok(PrivateMessage {
        id: id.to_string(),
        sender_id: sender_id.to_string(),
        recipient_id: recipient_id.to_string(),
        body: body.to_owned(),
        read: false,
        created,
    })
}

/// Both directions of the conversation between `a` and `b`, oldest
/// first, ties broken by id.
pub async fn list_conversation(
    db_pool: &SqlitePool,
    a: &Uuid,
    b: &Uuid,
) -> Result<Vec<PrivateMessage>, StoreError> {
    let messages = sqlx::query_as::<_, PrivateMessage>(
        "SELECT id,sender_id,recipient_id,body,read,created FROM private_messages \
         WHERE (sender_id=? AND recipient_id=?) OR (sender_id=? AND recipient_id=?) \
         ORDER BY created, id",
    )
    .bind(a.to_string())
    .bind(b.to_string())
    .bind(b.to_string())
    .bind(a.to_string())
    .fetch_all(db_pool)
    .await?;

    Ok(messages)
}

/// Flip the read flag on everything `other` has sent to `reader`.
/// Messages the reader sent are untouched.
pub async fn mark_conversation_read(
    db_pool: &SqlitePool,
    reader_id: &Uuid,
    other_id: &Uuid,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE private_messages SET read=1 WHERE recipient_id=? AND sender_id=? AND read=0",
    )
    .bind(reader_id.to_string())
    .bind(other_id.to_string())
    .execute(db_pool)
    .await?;

    Ok(())
}

pub async fn save_chat_message(
    db_pool: &SqlitePool,
    sender_id: &Uuid,
    receiver_id: &Uuid,
    room_name: &str,
    body: &str,
) -> Result<ChatMessage, StoreError> {
    let id = Uuid::now_v7();
    let created = now_millis();

    sqlx::query(
        "INSERT INTO chat_messages (id,sender_id,receiver_id,room_name,body,created) VALUES (?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(sender_id.to_string())
    .bind(receiver_id.to_string())
    .bind(room_name)
    .bind(body)
    .bind(created)
    .execute(db_pool)
    .await?;

    Ok(ChatMessage {
        id: id.to_string(),
        sender_id: sender_id.to_string(),
        receiver_id: receiver_id.to_string(),
        room_name: room_name.to_owned(),
        body: body.to_owned(),
        created,
    })
}

pub async fn list_room_messages(
    db_pool: &SqlitePool,
    room_name: &str,
) -> Result<Vec<ChatMessage>, StoreError> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT id,sender_id,receiver_id,room_name,body,created FROM chat_messages \
         WHERE room_name=? ORDER BY created, id",
    )
    .bind(room_name)
    .fetch_all(db_pool)
    .await?;

    Ok(messages)
}
