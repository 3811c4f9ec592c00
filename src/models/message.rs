use serde::{Deserialize, Serialize};

/// A reusable message template. Immutable in spirit: mailings reference it,
/// and deleting it cascades to every mailing built on it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub subject: String,
    pub body: String,
    pub owner_id: Option<i64>,
}
