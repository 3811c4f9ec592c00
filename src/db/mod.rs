use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::fs;
use std::str::FromStr;

use crate::error::Error;

pub async fn connect(database_url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// Apply every `migrations/*.sql` file in name order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    let mut entries: Vec<_> = fs::read_dir("migrations")
        .map_err(|e| Error::Config(format!("migrations directory: {e}")))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("sql") {
            let sql = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
            apply(pool, &sql).await?;
        }
    }
    Ok(())
}

/// Apply a migration script given as a string. Integration tests use this
/// with an in-memory pool where no migrations directory exists.
pub async fn apply(pool: &SqlitePool, sql: &str) -> Result<(), Error> {
    for statement in sql.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement).execute(pool).await?;
        }
    }
    Ok(())
}

pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}
