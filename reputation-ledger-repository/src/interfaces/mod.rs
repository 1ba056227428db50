//! This module defines and re-exports the interfaces for the ledger repositories.
//! It serves as a central point for accessing traits related to data interaction.
mod ledger;
mod notifications;

pub use ledger::{CommitOutcome, LedgerRepository};
pub use notifications::{NotificationRepository, PreferenceRepository};
