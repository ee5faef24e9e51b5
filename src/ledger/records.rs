use crate::identity::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One contributor's running record.
///
/// Created lazily on the first fund call from an address and never deleted,
/// only zeroed. `refunded` marks that the contributor has exercised a refund
/// in the current funding cycle; the next fund call clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    amount_funded: u128,
    refunded: bool,
}

impl Contribution {
    /// Native units currently funded by this contributor
    pub fn amount_funded(&self) -> u128 {
        self.amount_funded
    }

    /// Whether this contributor already refunded in the current cycle
    pub fn refunded(&self) -> bool {
        self.refunded
    }

    pub(crate) fn set_amount_funded(&mut self, amount: u128) {
        self.amount_funded = amount;
    }

    pub(crate) fn set_refunded(&mut self, refunded: bool) {
        self.refunded = refunded;
    }
}

/// Observable outcome of a state-changing ledger operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Fund { funder: Address, amount: u128 },
    Refund { funder: Address, amount: u128 },
    RefundAll { funder: Address, amount: u128 },
    OwnerChanged { previous: Address, new: Address },
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::Fund { funder, amount } => {
                write!(f, "Fund {{ funder: {}, amount: {} }}", funder, amount)
            }
            LedgerEvent::Refund { funder, amount } => {
                write!(f, "Refund {{ funder: {}, amount: {} }}", funder, amount)
            }
            LedgerEvent::RefundAll { funder, amount } => {
                write!(f, "RefundAll {{ funder: {}, amount: {} }}", funder, amount)
            }
            LedgerEvent::OwnerChanged { previous, new } => {
                write!(f, "OwnerChanged {{ previous: {}, new: {} }}", previous, new)
            }
        }
    }
}

/// An event plus the UTC second it was recorded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    event: LedgerEvent,
    timestamp: i64,
}

impl EventRecord {
    pub(crate) fn new(event: LedgerEvent) -> Self {
        Self {
            event,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn event(&self) -> &LedgerEvent {
        &self.event
    }

    /// UTC seconds when the event was recorded
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
