//! Error types for the vote ledger.
use thiserror::Error;
use reputation_ledger_repository::LedgerRepositoryError;

/// Represents errors surfaced by `VoteLedger` operations.
///
/// Only `VoteConflict` is transient; the caller may resubmit the same action.
/// Every variant leaves the vote, counts and account records as they were
/// before the call.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Caller is not authenticated")]
    Unauthenticated,
    #[error("Authors cannot vote on their own content")]
    SelfVoteForbidden,
    #[error("Vote could not be committed after {attempts} attempts")]
    VoteConflict { attempts: u32 },
    #[error("Point or count arithmetic overflowed")]
    ArithmeticOverflow,
    #[error("Ledger repository error: {0}")]
    Repository(#[from] LedgerRepositoryError),
}
