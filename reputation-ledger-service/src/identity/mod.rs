//! Caller identity.
use reputation_ledger_shared::types::UserId;

/// Source of the current caller's stable user id.
///
/// Returns `None` for unauthenticated callers.
pub trait Identity: Send + Sync {
    fn user_id(&self) -> Option<UserId>;
}

impl Identity for UserId {
    fn user_id(&self) -> Option<UserId> {
        Some(self.clone())
    }
}

impl Identity for Option<UserId> {
    fn user_id(&self) -> Option<UserId> {
        self.clone()
    }
}
