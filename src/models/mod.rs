pub mod attempt;
pub mod mailing;
pub mod message;
pub mod recipient;
pub mod user;

pub use attempt::{Attempt, AttemptOutcome};
pub use mailing::{Mailing, MailingStatus};
pub use message::Message;
pub use recipient::Recipient;
pub use user::User;
