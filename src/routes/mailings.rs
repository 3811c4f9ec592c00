/// Mailing endpoints: CRUD, dispatch, and the manual finish action.
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::models::{Mailing, MailingStatus, Recipient};
use crate::services::dispatch_service::{self, DeliveryReportRow, MailingSelector};
use crate::services::mailing_service::{self, MailingPatch, NewMailing};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MailingDetail {
    #[serde(flatten)]
    pub mailing: Mailing,
    pub recipients: Vec<Recipient>,
}

pub async fn create(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(req): Json<NewMailing>,
) -> Result<(StatusCode, Json<Mailing>), Error> {
    let mailing = mailing_service::create(&pool, &user, req).await?;
    tracing::info!("mailing {} created by user {}", mailing.id, user.id);
    Ok((StatusCode::CREATED, Json(mailing)))
}

pub async fn list(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Mailing>>, Error> {
    let mailings = mailing_service::list(&pool, &user).await?;
    Ok(Json(mailings))
}

pub async fn get_one(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MailingDetail>, Error> {
    let mailing = mailing_service::get(&pool, &user, id).await?;
    let recipients = mailing_service::recipients(&pool, id).await?;
    Ok(Json(MailingDetail {
        mailing,
        recipients,
    }))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<MailingPatch>,
) -> Result<Json<Mailing>, Error> {
    let mailing = mailing_service::update(&pool, &user, id, req).await?;
    Ok(Json(mailing))
}

pub async fn delete_one(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    mailing_service::delete(&pool, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /mailings/:id/send — dispatch a single mailing.
pub async fn send(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<DeliveryReportRow>>, Error> {
    let report = dispatch_service::dispatch(
        &state.pool,
        state.transport.as_ref(),
        &user,
        MailingSelector::ById(id),
    )
    .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SendByStatusQuery {
    pub status: String,
}

/// POST /mailings/send?status= — dispatch every visible mailing in a status.
pub async fn send_by_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SendByStatusQuery>,
) -> Result<Json<Vec<DeliveryReportRow>>, Error> {
    let status = MailingStatus::from_str(&query.status)
        .ok_or_else(|| Error::Validation(format!("unknown status: {}", query.status)))?;
    let report = dispatch_service::dispatch(
        &state.pool,
        state.transport.as_ref(),
        &user,
        MailingSelector::ByStatus(status),
    )
    .await?;
    Ok(Json(report))
}

/// POST /mailings/:id/finish — returns the updated mailing snapshot.
pub async fn finish(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Mailing>, Error> {
    let mailing = mailing_service::finish(&pool, &user, id).await?;
    Ok(Json(mailing))
}
