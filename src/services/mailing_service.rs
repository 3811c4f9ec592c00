/// Mailing management and status lifecycle.
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::error::Error;
use crate::models::{Attempt, Mailing, MailingStatus, Recipient, User};
use crate::rbac::{self, perm, Scope};

#[derive(Debug, Deserialize)]
pub struct NewMailing {
    pub message_id: i64,
    #[serde(default)]
    pub recipient_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MailingPatch {
    pub message_id: Option<i64>,
    pub recipient_ids: Option<Vec<i64>>,
}

async fn check_message_exists(pool: &SqlitePool, message_id: i64) -> Result<(), Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM messages WHERE id = ?")
        .bind(message_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(())
}

async fn check_recipients_exist(pool: &SqlitePool, ids: &[i64]) -> Result<(), Error> {
    for &id in ids {
        sqlx::query_scalar::<_, i64>("SELECT id FROM recipients WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(Error::NotFound)?;
    }
    Ok(())
}

/// Create a mailing and its recipient associations in one transaction.
pub async fn create(pool: &SqlitePool, user: &User, new_mailing: NewMailing) -> Result<Mailing, Error> {
    check_message_exists(pool, new_mailing.message_id).await?;
    check_recipients_exist(pool, &new_mailing.recipient_ids).await?;

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "INSERT INTO mailings (status, message_id, owner_id) VALUES ('created', ?, ?)",
    )
    .bind(new_mailing.message_id)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;
    let mailing_id = result.last_insert_rowid();

    for recipient_id in &new_mailing.recipient_ids {
        sqlx::query("INSERT INTO mailing_recipients (mailing_id, recipient_id) VALUES (?, ?)")
            .bind(mailing_id)
            .bind(recipient_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(Mailing {
        id: mailing_id,
        start_at: None,
        end_at: None,
        status: MailingStatus::Created,
        message_id: new_mailing.message_id,
        owner_id: Some(user.id),
    })
}

pub async fn list(pool: &SqlitePool, user: &User) -> Result<Vec<Mailing>, Error> {
    let rows = match rbac::visible_scope(user, perm::VIEW_ALL_MAILINGS) {
        Scope::All => {
            sqlx::query_as::<_, Mailing>("SELECT * FROM mailings ORDER BY status, message_id")
                .fetch_all(pool)
                .await?
        }
        Scope::OwnedBy(id) => {
            sqlx::query_as::<_, Mailing>(
                "SELECT * FROM mailings WHERE owner_id = ? ORDER BY status, message_id",
            )
            .bind(id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

pub async fn get(pool: &SqlitePool, user: &User, id: i64) -> Result<Mailing, Error> {
    let mailing = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    if !rbac::can_view(user, perm::VIEW_ALL_MAILINGS, mailing.owner_id) {
        return Err(Error::Forbidden);
    }
    Ok(mailing)
}

/// Recipient set of a mailing, in stable id order.
pub async fn recipients(pool: &SqlitePool, mailing_id: i64) -> Result<Vec<Recipient>, Error> {
    let rows = sqlx::query_as::<_, Recipient>(
        "SELECT r.* FROM recipients r \
         JOIN mailing_recipients mr ON mr.recipient_id = r.id \
         WHERE mr.mailing_id = ? ORDER BY r.id",
    )
    .bind(mailing_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn update(
    pool: &SqlitePool,
    user: &User,
    id: i64,
    patch: MailingPatch,
) -> Result<Mailing, Error> {
    let existing = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    rbac::authorize_mutation(user, existing.owner_id)?;

    let message_id = patch.message_id.unwrap_or(existing.message_id);
    check_message_exists(pool, message_id).await?;
    if let Some(ref ids) = patch.recipient_ids {
        check_recipients_exist(pool, ids).await?;
    }

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE mailings SET message_id = ? WHERE id = ?")
        .bind(message_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if let Some(ids) = patch.recipient_ids {
        sqlx::query("DELETE FROM mailing_recipients WHERE mailing_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for recipient_id in ids {
            sqlx::query("INSERT INTO mailing_recipients (mailing_id, recipient_id) VALUES (?, ?)")
                .bind(id)
                .bind(recipient_id)
                .execute(&mut *tx)
                .await?;
        }
    }
    tx.commit().await?;

    Ok(Mailing {
        message_id,
        ..existing
    })
}

pub async fn delete(pool: &SqlitePool, user: &User, id: i64) -> Result<(), Error> {
    let existing = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    rbac::authorize_mutation(user, existing.owner_id)?;

    sqlx::query("DELETE FROM mailings WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// First-dispatch transition: CREATED becomes ACTIVE and start_at is stamped.
/// The conditional UPDATE makes the status guard atomic, so two racing
/// dispatch calls cannot both stamp the start timestamp.
pub async fn activate(pool: &SqlitePool, mailing_id: i64) -> Result<(), Error> {
    sqlx::query("UPDATE mailings SET status = 'active', start_at = ? WHERE id = ? AND status = 'created'")
        .bind(now_epoch())
        .bind(mailing_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Manual administrative action: always moves to FINISHED and restamps
/// end_at, whatever the prior status. Not gated on dispatch having run.
pub async fn finish(pool: &SqlitePool, user: &User, mailing_id: i64) -> Result<Mailing, Error> {
    let existing = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ?")
        .bind(mailing_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    rbac::authorize_finish(user, existing.owner_id)?;

    sqlx::query("UPDATE mailings SET status = 'finished', end_at = ? WHERE id = ?")
        .bind(now_epoch())
        .bind(mailing_id)
        .execute(pool)
        .await?;

    let mailing = sqlx::query_as::<_, Mailing>("SELECT * FROM mailings WHERE id = ?")
        .bind(mailing_id)
        .fetch_one(pool)
        .await?;
    tracing::info!("mailing {} finished by user {}", mailing_id, user.id);
    Ok(mailing)
}

/// Attempt log, visibility-filtered. Attempts carry the owner of the mailing
/// they were dispatched for.
pub async fn list_attempts(pool: &SqlitePool, user: &User) -> Result<Vec<Attempt>, Error> {
    let rows = match rbac::visible_scope(user, perm::VIEW_ALL_ATTEMPTS) {
        Scope::All => {
            sqlx::query_as::<_, Attempt>(
                "SELECT * FROM attempts ORDER BY attempted_at, outcome, mailing_id",
            )
            .fetch_all(pool)
            .await?
        }
        Scope::OwnedBy(id) => {
            sqlx::query_as::<_, Attempt>(
                "SELECT * FROM attempts WHERE owner_id = ? \
                 ORDER BY attempted_at, outcome, mailing_id",
            )
            .bind(id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}
