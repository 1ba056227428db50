use serde::{Deserialize, Serialize};
use crate::types::VoteDirection;

/// Result of a committed vote action, as returned to the voter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteOutcome {
    pub upvotes: i64,
    pub downvotes: i64,
    /// The voter's standing direction after the action; `None` after a retraction.
    pub direction: Option<VoteDirection>,
}
