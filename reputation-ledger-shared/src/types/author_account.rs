use serde::{Deserialize, Serialize};
use crate::types::UserId;

/// One-time credit for posting a comment.
pub const COMMENT_CREATION_AWARD: i64 = 2;

/// Cumulative reputation of a content author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorAccount {
    pub user_id: UserId,
    pub points: i64,
}

impl AuthorAccount {
    /// Account state for a user that has never earned or lost points.
    pub fn empty(user_id: UserId) -> Self {
        Self { user_id, points: 0 }
    }
}
