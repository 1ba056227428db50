mod author_account;
mod content;
mod notification;
mod user_vote;
mod versioned;
mod vote_direction;
mod vote_outcome;
mod votes_count;

pub use author_account::{AuthorAccount, COMMENT_CREATION_AWARD};
pub use content::{ContentId, ContentRef, ContentType, UserId};
pub use notification::{
    EventClass, NewNotification, NotificationId, NotificationPreferences, NotificationRecord,
};
pub use user_vote::VoteKey;
pub use versioned::{AccountWrite, VoteSnapshot, VoteWrite, Version, Versioned, ABSENT};
pub use vote_direction::{VoteDirection, VoteWeights};
pub use vote_outcome::VoteOutcome;
pub use votes_count::VotesCount;
