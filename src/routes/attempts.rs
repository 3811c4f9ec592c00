/// Delivery attempt log. Read-only: attempts are written by dispatch and
/// never mutated through the API.
use axum::extract::State;
use axum::Json;
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::models::Attempt;
use crate::services::mailing_service;

pub async fn list(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Attempt>>, Error> {
    let attempts = mailing_service::list_attempts(&pool, &user).await?;
    Ok(Json(attempts))
}
