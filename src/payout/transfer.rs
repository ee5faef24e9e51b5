// Value transfer - moves native currency out of ledger custody
// The real transport (wallets, settlement rails) lives outside this crate

use crate::identity::Address;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Transfer of {amount} to {to} rejected: {reason}")]
    Rejected {
        to: Address,
        amount: u128,
        reason: String,
    },
}

// ============================================================================
// VALUE TRANSFER TRAIT
// ============================================================================

/// Trait for the native value-transfer primitive.
///
/// `credit` either moves the full amount to the recipient or fails; a
/// rejected transfer must surface to the caller, never be swallowed.
pub trait ValueTransfer: Send + Sync {
    /// Credit `amount` native units to `to`
    fn credit(&self, to: &Address, amount: u128) -> Result<(), TransferError>;
}

// ============================================================================
// RECORDING TRANSFER (TEST DOUBLE)
// ============================================================================

/// Mock implementation of ValueTransfer for testing.
///
/// Records every successful credit and can be switched into a rejecting mode
/// to simulate recipients that refuse the transfer.
#[derive(Default)]
pub struct RecordingTransfer {
    credits: Mutex<Vec<(Address, u128)>>,
    rejection: Mutex<Option<String>>,
}

impl RecordingTransfer {
    /// Create a mock that accepts every credit
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure to reject every credit with a reason
    pub fn with_rejection(self, reason: &str) -> Self {
        *self.rejection.lock().unwrap() = Some(reason.to_string());
        self
    }

    /// Start rejecting credits
    pub fn set_rejecting(&self, reason: &str) {
        *self.rejection.lock().unwrap() = Some(reason.to_string());
    }

    /// Resume accepting credits
    pub fn set_accepting(&self) {
        *self.rejection.lock().unwrap() = None;
    }

    /// All successful credits, in order
    pub fn credits(&self) -> Vec<(Address, u128)> {
        self.credits.lock().unwrap().clone()
    }

    /// Number of successful credits
    pub fn credit_count(&self) -> usize {
        self.credits.lock().unwrap().len()
    }

    /// Total amount credited to one recipient
    pub fn total_credited_to(&self, to: &Address) -> u128 {
        self.credits
            .lock()
            .unwrap()
            .iter()
            .filter(|(addr, _)| addr == to)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl ValueTransfer for RecordingTransfer {
    fn credit(&self, to: &Address, amount: u128) -> Result<(), TransferError> {
        if let Some(reason) = self.rejection.lock().unwrap().clone() {
            return Err(TransferError::Rejected {
                to: *to,
                amount,
                reason,
            });
        }

        self.credits.lock().unwrap().push((*to, amount));
        Ok(())
    }
}

// ============================================================================
// LOG TRANSFER
// ============================================================================

/// Transfer sink used by the CLI: records nothing, just logs the credit.
/// Actual native value movement belongs to the out-of-scope transport layer.
#[derive(Default)]
pub struct LogTransfer;

impl LogTransfer {
    pub fn new() -> Self {
        Self
    }
}

impl ValueTransfer for LogTransfer {
    fn credit(&self, to: &Address, amount: u128) -> Result<(), TransferError> {
        tracing::info!(recipient = %to, amount, "credited native value");
        Ok(())
    }
}
