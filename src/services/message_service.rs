/// Message template management.
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::error::Error;
use crate::models::{Message, User};
use crate::rbac::{self, perm, Scope};

#[derive(Debug, Deserialize, Validate)]
pub struct NewMessage {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MessagePatch {
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    #[validate(length(min = 1))]
    pub body: Option<String>,
}

pub async fn create(pool: &SqlitePool, user: &User, new_message: NewMessage) -> Result<Message, Error> {
    new_message.validate()?;
    let result = sqlx::query("INSERT INTO messages (subject, body, owner_id) VALUES (?, ?, ?)")
        .bind(&new_message.subject)
        .bind(&new_message.body)
        .bind(user.id)
        .execute(pool)
        .await?;

    Ok(Message {
        id: result.last_insert_rowid(),
        subject: new_message.subject,
        body: new_message.body,
        owner_id: Some(user.id),
    })
}

pub async fn list(pool: &SqlitePool, user: &User) -> Result<Vec<Message>, Error> {
    let rows = match rbac::visible_scope(user, perm::VIEW_ALL_MESSAGES) {
        Scope::All => {
            sqlx::query_as::<_, Message>("SELECT * FROM messages ORDER BY subject")
                .fetch_all(pool)
                .await?
        }
        Scope::OwnedBy(id) => {
            sqlx::query_as::<_, Message>(
                "SELECT * FROM messages WHERE owner_id = ? ORDER BY subject",
            )
            .bind(id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

pub async fn get(pool: &SqlitePool, user: &User, id: i64) -> Result<Message, Error> {
    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    if !rbac::can_view(user, perm::VIEW_ALL_MESSAGES, message.owner_id) {
        return Err(Error::Forbidden);
    }
    Ok(message)
}

pub async fn update(
    pool: &SqlitePool,
    user: &User,
    id: i64,
    patch: MessagePatch,
) -> Result<Message, Error> {
    patch.validate()?;
    let existing = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    rbac::authorize_mutation(user, existing.owner_id)?;

    let subject = patch.subject.unwrap_or(existing.subject);
    let body = patch.body.unwrap_or(existing.body);
    sqlx::query("UPDATE messages SET subject = ?, body = ? WHERE id = ?")
        .bind(&subject)
        .bind(&body)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(Message {
        id,
        subject,
        body,
        owner_id: existing.owner_id,
    })
}

/// Deletion cascades to every mailing built on this message.
pub async fn delete(pool: &SqlitePool, user: &User, id: i64) -> Result<(), Error> {
    let existing = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    rbac::authorize_mutation(user, existing.owner_id)?;

    sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
