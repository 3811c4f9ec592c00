/// Registration and login endpoints.
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Error;
use crate::models::User;
use crate::services::user_service::{self, NewUser};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

pub async fn register(
    State(pool): State<SqlitePool>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let user = user_service::register(&pool, req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(pool): State<SqlitePool>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Error> {
    let token = user_service::login(&pool, &req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}
