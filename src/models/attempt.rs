use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success,
    Failure,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// One delivery try for one recipient. Append-only: rows are written by the
/// dispatch loop and never updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attempt {
    pub id: i64,
    pub attempted_at: i64,
    pub outcome: AttemptOutcome,
    pub server_response: String,
    pub mailing_id: i64,
    /// Denormalized copy of the mailing's owner at dispatch time.
    pub owner_id: Option<i64>,
}
