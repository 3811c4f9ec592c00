//! Mailing dispatch: deliver a mailing's message to every associated
//! recipient, record one attempt per recipient, and advance the mailing
//! lifecycle on first dispatch.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::error::Error;
use crate::models::{AttemptOutcome, Mailing, MailingStatus, Message, User};
use crate::rbac::{self, perm, Scope};
use crate::services::mailing_service;
use crate::smtp::MailTransport;

/// Diagnostic recorded on every successful attempt and echoed in the report.
pub const DELIVERY_OK: &str = "Sending mail successful";

/// Dispatch target: one mailing by id, or every visible mailing in a status.
#[derive(Debug, Clone, Copy)]
pub enum MailingSelector {
    ById(i64),
    ByStatus(MailingStatus),
}

/// One row of the caller-facing delivery report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReportRow {
    pub outcome: String,
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

async fn resolve(
    pool: &SqlitePool,
    user: &User,
    selector: MailingSelector,
) -> Result<Vec<Mailing>, Error> {
    match selector {
        MailingSelector::ById(id) => {
            let mailing = mailing_service::get(pool, user, id).await?;
            Ok(vec![mailing])
        }
        MailingSelector::ByStatus(status) => {
            let rows = match rbac::visible_scope(user, perm::VIEW_ALL_MAILINGS) {
                Scope::All => {
                    sqlx::query_as::<_, Mailing>(
                        "SELECT * FROM mailings WHERE status = ? ORDER BY id",
                    )
                    .bind(status)
                    .fetch_all(pool)
                    .await?
                }
                Scope::OwnedBy(owner) => {
                    sqlx::query_as::<_, Mailing>(
                        "SELECT * FROM mailings WHERE status = ? AND owner_id = ? ORDER BY id",
                    )
                    .bind(status)
                    .bind(owner)
                    .fetch_all(pool)
                    .await?
                }
            };
            Ok(rows)
        }
    }
}

/// Deliver every resolved mailing, one transport call per recipient.
///
/// Recipients are processed independently: a transport failure becomes a
/// FAILURE attempt and the loop moves on, so the call as a whole always
/// completes once the selector resolves. The CREATED-to-ACTIVE transition
/// fires at most once per mailing per call, even when the recipient set is
/// empty. There is no retry and no queue: one transport invocation per
/// recipient per call is final for that call.
pub async fn dispatch(
    pool: &SqlitePool,
    transport: &dyn MailTransport,
    user: &User,
    selector: MailingSelector,
) -> Result<Vec<DeliveryReportRow>, Error> {
    let mailings = resolve(pool, user, selector).await?;
    let mut report = Vec::new();

    for mailing in mailings {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(mailing.message_id)
            .fetch_optional(pool)
            .await?
            .ok_or(Error::NotFound)?;
        let recipients = mailing_service::recipients(pool, mailing.id).await?;

        // Status guard runs before the recipient loop so zero-recipient
        // mailings still transition on their first dispatch.
        if mailing.status == MailingStatus::Created {
            mailing_service::activate(pool, mailing.id).await?;
        }

        tracing::info!(
            mailing_id = mailing.id,
            recipients = recipients.len(),
            "dispatching mailing"
        );

        for recipient in recipients {
            let (outcome, response) = match transport
                .send(&message.subject, &message.body, &recipient.email)
                .await
            {
                Ok(()) => (AttemptOutcome::Success, DELIVERY_OK.to_string()),
                Err(e) => {
                    tracing::warn!(
                        mailing_id = mailing.id,
                        recipient = %recipient.email,
                        "delivery failed: {e}"
                    );
                    (AttemptOutcome::Failure, e.to_string())
                }
            };

            sqlx::query(
                "INSERT INTO attempts (attempted_at, outcome, server_response, mailing_id, owner_id) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(now_epoch())
            .bind(outcome)
            .bind(&response)
            .bind(mailing.id)
            .bind(mailing.owner_id)
            .execute(pool)
            .await?;

            report.push(DeliveryReportRow {
                outcome: response,
                subject: message.subject.clone(),
                body: message.body.clone(),
                recipient: recipient.email,
            });
        }
    }

    Ok(report)
}
