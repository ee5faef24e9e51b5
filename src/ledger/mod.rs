// Ledger module - THE FUNDING CORE
// Contribution accounting, goal evaluation, and the refund state machine

mod funding;
mod records;
mod state;

pub use funding::{
    FundingLedger, LedgerError, MIN_CUSTOM_REFUND_THRESHOLD, MIN_FUND_THRESHOLD,
};
pub use records::{Contribution, EventRecord, LedgerEvent};
pub use state::{LedgerState, StateError};
