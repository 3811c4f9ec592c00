/// Recipient management.
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::error::Error;
use crate::models::{Recipient, User};
use crate::rbac::{self, perm, Scope};

#[derive(Debug, Deserialize, Validate)]
pub struct NewRecipient {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 150))]
    pub full_name: String,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecipientPatch {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub full_name: Option<String>,
    pub comment: Option<String>,
}

/// Email uniqueness is global, not per-owner.
async fn check_email_free(
    pool: &SqlitePool,
    email: &str,
    exclude_id: Option<i64>,
) -> Result<(), Error> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM recipients WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    match existing {
        Some(id) if Some(id) != exclude_id => Err(Error::Validation(format!(
            "recipient already exists: {email}"
        ))),
        _ => Ok(()),
    }
}

pub async fn create(
    pool: &SqlitePool,
    user: &User,
    new_recipient: NewRecipient,
) -> Result<Recipient, Error> {
    new_recipient.validate()?;
    check_email_free(pool, &new_recipient.email, None).await?;

    let result =
        sqlx::query("INSERT INTO recipients (email, full_name, comment, owner_id) VALUES (?, ?, ?, ?)")
            .bind(&new_recipient.email)
            .bind(&new_recipient.full_name)
            .bind(&new_recipient.comment)
            .bind(user.id)
            .execute(pool)
            .await?;

    Ok(Recipient {
        id: result.last_insert_rowid(),
        email: new_recipient.email,
        full_name: new_recipient.full_name,
        comment: new_recipient.comment,
        owner_id: Some(user.id),
    })
}

pub async fn list(pool: &SqlitePool, user: &User) -> Result<Vec<Recipient>, Error> {
    let rows = match rbac::visible_scope(user, perm::VIEW_ALL_RECIPIENTS) {
        Scope::All => {
            sqlx::query_as::<_, Recipient>("SELECT * FROM recipients ORDER BY full_name")
                .fetch_all(pool)
                .await?
        }
        Scope::OwnedBy(id) => {
            sqlx::query_as::<_, Recipient>(
                "SELECT * FROM recipients WHERE owner_id = ? ORDER BY full_name",
            )
            .bind(id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

pub async fn get(pool: &SqlitePool, user: &User, id: i64) -> Result<Recipient, Error> {
    let recipient = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    if !rbac::can_view(user, perm::VIEW_ALL_RECIPIENTS, recipient.owner_id) {
        return Err(Error::Forbidden);
    }
    Ok(recipient)
}

pub async fn update(
    pool: &SqlitePool,
    user: &User,
    id: i64,
    patch: RecipientPatch,
) -> Result<Recipient, Error> {
    patch.validate()?;
    let existing = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    rbac::authorize_mutation(user, existing.owner_id)?;

    let email = patch.email.unwrap_or(existing.email);
    check_email_free(pool, &email, Some(id)).await?;
    let full_name = patch.full_name.unwrap_or(existing.full_name);
    let comment = patch.comment.or(existing.comment);

    sqlx::query("UPDATE recipients SET email = ?, full_name = ?, comment = ? WHERE id = ?")
        .bind(&email)
        .bind(&full_name)
        .bind(&comment)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(Recipient {
        id,
        email,
        full_name,
        comment,
        owner_id: existing.owner_id,
    })
}

/// Deleting a recipient drops its mailing associations but not the mailings.
pub async fn delete(pool: &SqlitePool, user: &User, id: i64) -> Result<(), Error> {
    let existing = sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    rbac::authorize_mutation(user, existing.owner_id)?;

    sqlx::query("DELETE FROM recipients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
