/// Message template endpoints.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::models::Message;
use crate::services::message_service::{self, MessagePatch, NewMessage};

pub async fn create(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(req): Json<NewMessage>,
) -> Result<(StatusCode, Json<Message>), Error> {
    let message = message_service::create(&pool, &user, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Message>>, Error> {
    let messages = message_service::list(&pool, &user).await?;
    Ok(Json(messages))
}

pub async fn get_one(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Message>, Error> {
    let message = message_service::get(&pool, &user, id).await?;
    Ok(Json(message))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<MessagePatch>,
) -> Result<Json<Message>, Error> {
    let message = message_service::update(&pool, &user, id, req).await?;
    Ok(Json(message))
}

pub async fn delete_one(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    message_service::delete(&pool, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
