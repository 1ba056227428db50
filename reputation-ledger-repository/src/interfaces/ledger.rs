//! This module defines the `LedgerRepository` trait, which provides an interface
//! for the optimistic read-modify-write cycle over votes, vote counts and author accounts.
use reputation_ledger_shared::types::{
    AccountWrite, AuthorAccount, ContentRef, UserId, Versioned, VoteDirection, VoteKey,
    VoteSnapshot, VoteWrite, VotesCount,
};
use crate::errors::LedgerRepositoryError;

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every record matched its expected version and all writes were applied.
    Committed,
    /// At least one record changed since it was read; nothing was written.
    Conflict,
}

/// A trait that defines the interface for interacting with the ledger data store.
///
/// Implementors provide versioned reads and conditional, all-or-nothing writes.
/// Isolation between concurrent voters comes entirely from the store: a write set
/// is only applied when every record it touches still carries the version that
/// was observed when the snapshot was read.
#[async_trait::async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Reads the vote record, the vote counts and (if `author_id` is given) the author
    /// account for `key`, each paired with its current version.
    ///
    /// Missing records are returned as their empty value at version `ABSENT`.
    ///
    /// # Arguments
    ///
    /// * `key` - The voter and content item.
    /// * `author_id` - The content author whose points the vote affects, if any.
    ///
    /// # Returns
    ///
    /// A `Result` with the `VoteSnapshot` or a `LedgerRepositoryError` if the read fails.
    async fn load_vote_snapshot(
        &self,
        key: &VoteKey,
        author_id: Option<&UserId>,
    ) -> Result<VoteSnapshot, LedgerRepositoryError>;

    /// Applies a vote write set atomically.
    ///
    /// # Arguments
    ///
    /// * `write` - The new record values and the versions they were derived from.
    ///
    /// # Returns
    ///
    /// `CommitOutcome::Conflict` when any version no longer matches, in which case no
    /// record was modified. A `LedgerRepositoryError` means the write failed and was
    /// rolled back.
    async fn commit_vote(&self, write: &VoteWrite) -> Result<CommitOutcome, LedgerRepositoryError>;

    /// Reads an author account with its version; unknown accounts have zero points.
    async fn load_account(
        &self,
        user_id: &UserId,
    ) -> Result<Versioned<AuthorAccount>, LedgerRepositoryError>;

    /// Conditionally writes a single author account.
    async fn commit_account(
        &self,
        write: &AccountWrite,
    ) -> Result<CommitOutcome, LedgerRepositoryError>;

    /// Retrieves the standing vote of a voter on a content item, if any.
    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteDirection>, LedgerRepositoryError>;

    /// Retrieves the vote counts of a content item; unknown items have zero counts.
    async fn get_votes_count(&self, content: &ContentRef) -> Result<VotesCount, LedgerRepositoryError>;

    /// Retrieves up to `limit` accounts ordered by points (descending), then user id.
    async fn top_accounts(&self, limit: usize) -> Result<Vec<AuthorAccount>, LedgerRepositoryError>;
}
