//! Error types for the ledger repository.
//! Defines specific errors that can occur during database operations on votes,
//! vote counts and author accounts.
use thiserror::Error;

/// Represents errors that can occur within the ledger repository.
///
/// A stale optimistic write is not an error: it is reported as
/// `CommitOutcome::Conflict` so the caller can retry.
#[derive(Debug, Error)]
pub enum LedgerRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid vote direction: {0}")]
    InvalidVoteDirection(i16),
}
