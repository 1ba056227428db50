//! # Reputation Ledger Service
//! This crate defines the operations exposed to the application layer: casting votes
//! against the optimistic ledger, crediting content-creation awards, reading counts and
//! the leaderboard, and best-effort notification fan-out with read-state transitions.
pub mod errors;
pub mod identity;
pub mod ledger;
pub mod notifier;

pub use errors::{LedgerError, NotifierError};
pub use identity::Identity;
pub use ledger::{RetryPolicy, VoteLedger, VoteRequest, VoteTransition};
pub use notifier::Notifier;
