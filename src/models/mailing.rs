use serde::{Deserialize, Serialize};

/// Mailing lifecycle. Transitions are monotonic forward: created mailings
/// become active on first dispatch, and finishing is a manual action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MailingStatus {
    Created,
    Active,
    Finished,
}

impl MailingStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(Self::Created),
            "active" => Some(Self::Active),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mailing {
    pub id: i64,
    /// Stamped once, on the first transition into ACTIVE.
    pub start_at: Option<i64>,
    /// Stamped (and restamped) whenever the mailing is finished.
    pub end_at: Option<i64>,
    pub status: MailingStatus,
    pub message_id: i64,
    pub owner_id: Option<i64>,
}
