/// Recipient endpoints.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::models::Recipient;
use crate::services::recipient_service::{self, NewRecipient, RecipientPatch};

pub async fn create(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(req): Json<NewRecipient>,
) -> Result<(StatusCode, Json<Recipient>), Error> {
    let recipient = recipient_service::create(&pool, &user, req).await?;
    tracing::info!("recipient created: {}", recipient.email);
    Ok((StatusCode::CREATED, Json(recipient)))
}

pub async fn list(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Recipient>>, Error> {
    let recipients = recipient_service::list(&pool, &user).await?;
    Ok(Json(recipients))
}

pub async fn get_one(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Recipient>, Error> {
    let recipient = recipient_service::get(&pool, &user, id).await?;
    Ok(Json(recipient))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<RecipientPatch>,
) -> Result<Json<Recipient>, Error> {
    let recipient = recipient_service::update(&pool, &user, id, req).await?;
    Ok(Json(recipient))
}

pub async fn delete_one(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    recipient_service::delete(&pool, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
