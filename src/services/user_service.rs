/// User registration and login.
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth;
use crate::db::now_epoch;
use crate::error::Error;
use crate::models::User;

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 150))]
    pub full_name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

pub async fn register(pool: &SqlitePool, new_user: NewUser) -> Result<User, Error> {
    new_user.validate()?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&new_user.email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(Error::Validation(format!(
            "user already exists: {}",
            new_user.email
        )));
    }

    let password_hash = auth::hash_password(&new_user.password)?;
    let now = now_epoch();
    let result = sqlx::query(
        "INSERT INTO users (email, full_name, password_hash, permissions, created_at) \
         VALUES (?, ?, ?, '', ?)",
    )
    .bind(&new_user.email)
    .bind(&new_user.full_name)
    .bind(&password_hash)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!("user registered: {}", new_user.email);
    Ok(User {
        id: result.last_insert_rowid(),
        email: new_user.email,
        full_name: new_user.full_name,
        password_hash,
        token: None,
        permissions: String::new(),
        created_at: now,
    })
}

/// Verify credentials and issue a fresh bearer token.
pub async fn login(pool: &SqlitePool, email: &str, password: &str) -> Result<String, Error> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::Unauthorized)?;

    if !auth::verify_password(&user.password_hash, password) {
        return Err(Error::Unauthorized);
    }

    let token = uuid::Uuid::new_v4().to_string();
    sqlx::query("UPDATE users SET token = ? WHERE id = ?")
        .bind(&token)
        .bind(user.id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Append a permission name to the user's grant list. There is no admin UI
/// for this; operators run it directly, tests use it to set up fixtures.
pub async fn grant_permission(pool: &SqlitePool, user_id: i64, name: &str) -> Result<(), Error> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound)?;
    if user.has_permission(name) {
        return Ok(());
    }
    let permissions = if user.permissions.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", user.permissions, name)
    };
    sqlx::query("UPDATE users SET permissions = ? WHERE id = ?")
        .bind(&permissions)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
