use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::{ContentRef, UserId};

/// Composite key of a user's vote on a content item.
///
/// Flattens (voter, content type, content id) into one hashable value so that
/// vote lookups never have to walk nested per-user or per-item structures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoteKey {
    pub voter_id: UserId,
    pub content: ContentRef,
}

impl VoteKey {
    pub fn new(voter_id: UserId, content: ContentRef) -> Self {
        Self { voter_id, content }
    }
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.voter_id, self.content)
    }
}
