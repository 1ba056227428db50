//! # Reputation Ledger Shared
//! This crate defines shared data structures and types used across the reputation ledger crates.
//! It includes identifiers, vote records, vote counts, author accounts, notifications and the
//! versioned snapshots exchanged between the ledger and its storage backends.
pub mod types;
