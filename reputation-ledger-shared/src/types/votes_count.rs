use serde::{Deserialize, Serialize};
use crate::types::{ContentRef, VoteDirection};

/// Represents the aggregated vote counts for a content item.
///
/// `upvotes` and `downvotes` track the number of standing vote records in each
/// direction and never go below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotesCount {
    pub content: ContentRef,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VotesCount {
    /// Counts for an item that has never been voted on.
    pub fn empty(content: ContentRef) -> Self {
        Self {
            content,
            upvotes: 0,
            downvotes: 0,
        }
    }

    pub fn count(&self, direction: VoteDirection) -> i64 {
        match direction {
            VoteDirection::Up => self.upvotes,
            VoteDirection::Down => self.downvotes,
        }
    }
}
