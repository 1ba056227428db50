mod ledger;
mod notifier;

pub use ledger::LedgerError;
pub use notifier::NotifierError;
