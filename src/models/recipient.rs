use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipient {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub comment: Option<String>,
    pub owner_id: Option<i64>,
}
