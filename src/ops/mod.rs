pub mod classify;
pub mod ledger;
pub mod sections;
pub mod triage;
