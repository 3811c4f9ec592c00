//! Ownership and visibility policy.
//!
//! Two tiers only: a coarse per-entity "view all" permission widens list
//! queries to every record; everyone else sees their own rows. Mutation is
//! owner-only with no permission override.

use crate::error::Error;
use crate::models::User;

pub mod perm {
    pub const VIEW_ALL_RECIPIENTS: &str = "view_all_recipients";
    pub const VIEW_ALL_MESSAGES: &str = "view_all_messages";
    pub const VIEW_ALL_MAILINGS: &str = "view_all_mailings";
    pub const VIEW_ALL_ATTEMPTS: &str = "view_all_attempts";
    pub const FINISH_MAILING: &str = "finish_mailing";
}

/// Row filter applied to list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(i64),
}

pub fn visible_scope(user: &User, view_all_perm: &str) -> Scope {
    if user.has_permission(view_all_perm) {
        Scope::All
    } else {
        Scope::OwnedBy(user.id)
    }
}

/// A single record is visible when it falls inside the caller's list scope.
pub fn can_view(user: &User, view_all_perm: &str, owner_id: Option<i64>) -> bool {
    match visible_scope(user, view_all_perm) {
        Scope::All => true,
        Scope::OwnedBy(id) => owner_id == Some(id),
    }
}

/// Update/delete is permitted only to the record's owner. The "view all"
/// permission deliberately does not extend to mutation.
pub fn authorize_mutation(user: &User, owner_id: Option<i64>) -> Result<(), Error> {
    if owner_id == Some(user.id) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Finishing a mailing is an administrative action: the owner may do it, as
/// may anyone holding the dedicated permission.
pub fn authorize_finish(user: &User, owner_id: Option<i64>) -> Result<(), Error> {
    if owner_id == Some(user.id) || user.has_permission(perm::FINISH_MAILING) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}
