// Payout module - the native value-transfer seam

mod transfer;

pub use transfer::{LogTransfer, RecordingTransfer, TransferError, ValueTransfer};
