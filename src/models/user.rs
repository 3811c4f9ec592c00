use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Space-separated permission names, see `rbac::perm`.
    pub permissions: String,
    pub created_at: i64,
}

impl User {
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.split_whitespace().any(|p| p == name)
    }
}
