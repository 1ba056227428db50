//! Versioned views of ledger records.
//!
//! Every record the ledger touches carries a version counter that the store bumps
//! on each committed write. A write set carries the versions observed when the
//! snapshot was read; the store rejects the whole write set when any of them no
//! longer matches.
use serde::{Deserialize, Serialize};
use crate::types::{AuthorAccount, VoteDirection, VoteKey, VotesCount};

/// Monotonic per-record version.
pub type Version = i64;

/// Version of a record that does not exist in the store.
pub const ABSENT: Version = 0;

/// A value paired with the record version it was read at (or is expected at).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: Version) -> Self {
        Self { value, version }
    }

    /// Replaces the value while keeping the observed version as the expectation.
    pub fn with_value<U>(&self, value: U) -> Versioned<U> {
        Versioned {
            value,
            version: self.version,
        }
    }
}

/// Consistent read of the three records a vote touches.
///
/// `author` is `None` when the content item has no author account to credit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteSnapshot {
    pub key: VoteKey,
    pub vote: Versioned<Option<VoteDirection>>,
    pub counts: Versioned<VotesCount>,
    pub author: Option<Versioned<AuthorAccount>>,
}

/// All-or-nothing write set produced from a `VoteSnapshot`.
///
/// `vote.value == None` deletes the vote record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteWrite {
    pub key: VoteKey,
    pub vote: Versioned<Option<VoteDirection>>,
    pub counts: Versioned<VotesCount>,
    pub author: Option<Versioned<AuthorAccount>>,
}

/// Conditional write of a single author account.
pub type AccountWrite = Versioned<AuthorAccount>;
