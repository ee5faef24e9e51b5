// Payout tests
// Tests for the value-transfer seam and its test double

use fundpool::identity::Keypair;
use fundpool::payout::{LogTransfer, RecordingTransfer, TransferError, ValueTransfer};

// ============================================================================
// RECORDING TRANSFER
// ============================================================================

#[test]
fn test_credits_are_recorded_in_order() {
    let transfer = RecordingTransfer::new();
    let alice = Keypair::generate().address();
    let bob = Keypair::generate().address();

    transfer.credit(&alice, 100).unwrap();
    transfer.credit(&bob, 200).unwrap();
    transfer.credit(&alice, 50).unwrap();

    assert_eq!(
        transfer.credits(),
        vec![(alice, 100), (bob, 200), (alice, 50)]
    );
    assert_eq!(transfer.total_credited_to(&alice), 150);
    assert_eq!(transfer.total_credited_to(&bob), 200);
}

#[test]
fn test_rejection_carries_recipient_and_amount() {
    let transfer = RecordingTransfer::new().with_rejection("recipient offline");
    let alice = Keypair::generate().address();

    let err = transfer.credit(&alice, 100).unwrap_err();
    match err {
        TransferError::Rejected { to, amount, reason } => {
            assert_eq!(to, alice);
            assert_eq!(amount, 100);
            assert_eq!(reason, "recipient offline");
        }
    }
    assert_eq!(transfer.credit_count(), 0);
}

#[test]
fn test_rejection_mode_is_reversible() {
    let transfer = RecordingTransfer::new();
    let alice = Keypair::generate().address();

    transfer.set_rejecting("closed");
    assert!(transfer.credit(&alice, 1).is_err());

    transfer.set_accepting();
    transfer.credit(&alice, 1).unwrap();
    assert_eq!(transfer.credit_count(), 1);
}

// ============================================================================
// LOG TRANSFER
// ============================================================================

#[test]
fn test_log_transfer_always_accepts() {
    let transfer = LogTransfer::new();
    let alice = Keypair::generate().address();

    transfer.credit(&alice, u128::MAX).unwrap();
    transfer.credit(&alice, 0).unwrap();
}
