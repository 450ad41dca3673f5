//! Read-only view of the user directory. Accounts themselves are owned
//! by the surrounding application; we only resolve handles and ids.

use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub handle: String,
    pub fullname: Option<String>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("unknown user")]
    NotFound,
    #[error("malformed user id: {0}")]
    Malformed(#[from] uuid::Error),
    #[error("user directory unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

pub async fn find_by_handle(
    db_pool: &SqlitePool,
    handle: &str,
) -> Result<UserRecord, DirectoryError> {
    let row: Option<(String, String, Option<String>)> =
        sqlx::query_as("SELECT id,handle,fullname FROM users WHERE handle=?")
            .bind(handle)
            .fetch_optional(db_pool)
            .await?;

    let (id, handle, fullname) = row.ok_or(DirectoryError::NotFound)?;
    Ok(UserRecord {
        id: Uuid::parse_str(&id)?,
        handle,
        fullname,
    })
}

pub async fn find_by_id(
    db_pool: &SqlitePool,
    user_id: &Uuid,
) -> Result<UserRecord, DirectoryError> {
    let row: Option<(String, String, Option<String>)> =
        sqlx::query_as("SELECT id,handle,fullname FROM users WHERE id=?")
            .bind(user_id.to_string())
            .fetch_optional(db_pool)
            .await?;

    let (id, handle, fullname) = row.ok_or(DirectoryError::NotFound)?;
    Ok(UserRecord {
        id: Uuid::parse_str(&id)?,
        handle,
        fullname,
    })
}

const SAMPLE_USERS: &[(&str, &str, &str)] = &[
    ("alice@gmail.com", "alice", "Alice Johnson"),
    ("bob@gmail.com", "bob", "Bob Smith"),
    ("charlie@gmail.com", "charlie", "Charlie Brown"),
    ("david@gmail.com", "david", "David Wilson"),
    ("emma@gmail.com", "emma", "Emma Stone"),
];

/// Insert the development fixture accounts. Safe to run on every boot.
pub async fn seed_sample_users(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (email, handle, fullname) in SAMPLE_USERS {
        sqlx::query("INSERT OR IGNORE INTO users (id,handle,fullname,email) VALUES (?,?,?,?)")
            .bind(Uuid::now_v7().to_string())
            .bind(handle)
            .bind(fullname)
            .bind(email)
            .execute(db_pool)
            .await?;
    }
    Ok(())
}
