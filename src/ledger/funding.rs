// Funding ledger - contribution accounting and the refund/withdraw state machine
//
// Operations take `&mut self` and either fully commit (balances, flags,
// event) or return an error with no state change. Callers needing a global
// order across threads wrap the ledger in a Mutex; no operation blocks or
// suspends internally.

use crate::identity::Address;
use crate::ledger::records::LedgerEvent;
use crate::ledger::state::{ArithmeticOverflow, LedgerState};
use crate::oracle::{to_reference_currency, ConvertError, FeedError, PriceFeed, SCALING_FACTOR};
use crate::payout::{TransferError, ValueTransfer};
use std::sync::Arc;
use thiserror::Error;

/// Minimum USD-scale value of a single contribution (50 USD)
pub const MIN_FUND_THRESHOLD: u128 = 50 * SCALING_FACTOR;

/// Minimum USD-scale value of a partial refund (10 USD)
pub const MIN_CUSTOM_REFUND_THRESHOLD: u128 = 10 * SCALING_FACTOR;

/// Errors from ledger operations. Every error means the operation was
/// rejected with no partial effect.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Contribution is below the USD minimum")]
    InsufficientContribution,

    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Cannot change owner to the zero address")]
    InvalidOwner,

    #[error("Refunds are not available")]
    RefundsClosed,

    #[error("No funds to refund")]
    NoFundsToRefund,

    #[error("Refund already processed")]
    AlreadyRefunded,

    #[error("Requested refund is below the USD minimum")]
    RefundTooSmall,

    #[error("Requested amount equals the full balance; call refund instead")]
    UseFullRefundInstead,

    #[error("Requested refund exceeds the funded balance")]
    RefundExceedsBalance,

    #[error("Price oracle unavailable: {0}")]
    OracleUnavailable(#[source] FeedError),

    #[error(transparent)]
    TransferFailed(#[from] TransferError),

    #[error("Arithmetic overflow")]
    Overflow,
}

impl From<ConvertError> for LedgerError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Feed(e) => LedgerError::OracleUnavailable(e),
            ConvertError::Overflow => LedgerError::Overflow,
        }
    }
}

impl From<ArithmeticOverflow> for LedgerError {
    fn from(_: ArithmeticOverflow) -> Self {
        LedgerError::Overflow
    }
}

/// The funding ledger: state plus its two collaborators, fixed at
/// construction. The price feed is re-read on every USD-denominated check,
/// so outcomes can legitimately change between operations.
pub struct FundingLedger {
    state: LedgerState,
    price_feed: Arc<dyn PriceFeed>,
    transfers: Arc<dyn ValueTransfer>,
}

impl FundingLedger {
    /// Create a fresh ledger owned by `owner`
    pub fn new(
        owner: Address,
        price_feed: Arc<dyn PriceFeed>,
        transfers: Arc<dyn ValueTransfer>,
    ) -> Self {
        Self {
            state: LedgerState::new(owner),
            price_feed,
            transfers,
        }
    }

    /// Rehydrate a ledger from persisted state
    pub fn from_state(
        state: LedgerState,
        price_feed: Arc<dyn PriceFeed>,
        transfers: Arc<dyn ValueTransfer>,
    ) -> Self {
        Self {
            state,
            price_feed,
            transfers,
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// The underlying state (for persistence and inspection)
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Take the state back out (for persistence)
    pub fn into_state(self) -> LedgerState {
        self.state
    }

    /// The price feed collaborator wired at construction
    pub fn price_feed(&self) -> Arc<dyn PriceFeed> {
        Arc::clone(&self.price_feed)
    }

    pub fn owner(&self) -> Address {
        self.state.owner()
    }

    pub fn funding_goal(&self) -> u128 {
        self.state.funding_goal()
    }

    pub fn goal_reached(&self) -> bool {
        self.state.goal_reached()
    }

    pub fn treasury_balance(&self) -> u128 {
        self.state.treasury_balance()
    }

    pub fn amount_funded(&self, address: &Address) -> u128 {
        self.state.amount_funded(address)
    }

    pub fn refunded(&self, address: &Address) -> bool {
        self.state.refunded(address)
    }

    pub fn funder(&self, index: usize) -> Option<Address> {
        self.state.funder(index)
    }

    pub fn funder_count(&self) -> usize {
        self.state.funder_count()
    }

    pub fn total_funded(&self) -> u128 {
        self.state.total_funded()
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Accept a contribution of `value` native units from `caller`.
    ///
    /// The attached value is assumed already moved into custody by the
    /// calling transport. Rejects contributions whose USD value is below
    /// [`MIN_FUND_THRESHOLD`]. A returning funder's `refunded` flag is
    /// cleared, opening a fresh refund cycle.
    pub fn fund(&mut self, caller: Address, value: u128) -> Result<LedgerEvent, LedgerError> {
        let usd_value = to_reference_currency(value, self.price_feed.as_ref())?;
        if usd_value < MIN_FUND_THRESHOLD {
            return Err(LedgerError::InsufficientContribution);
        }

        self.state.apply_fund(caller, value)?;

        let event = LedgerEvent::Fund {
            funder: caller,
            amount: value,
        };
        self.state.push_event(event.clone());
        tracing::info!(funder = %caller, amount = value, usd_value, "contribution accepted");
        Ok(event)
    }

    /// Set the funding goal to `goal_usd` whole USD. Owner only.
    /// Does not re-evaluate the goal-reached flag.
    pub fn update_goal(&mut self, caller: Address, goal_usd: u64) -> Result<(), LedgerError> {
        self.ensure_owner(&caller)?;

        self.state
            .set_funding_goal(goal_usd as u128 * SCALING_FACTOR);
        tracing::debug!(goal_usd, "funding goal updated");
        Ok(())
    }

    /// Evaluate the goal against the total currently funded, at the oracle's
    /// current price. Sets the one-way goal-reached flag when the total meets
    /// or exceeds the goal; idempotent afterwards. Returns the flag.
    pub fn check_goal_reached(&mut self) -> Result<bool, LedgerError> {
        if self.state.goal_reached() {
            return Ok(true);
        }

        let total_usd = to_reference_currency(self.state.total_funded(), self.price_feed.as_ref())?;
        if total_usd >= self.state.funding_goal() {
            self.state.mark_goal_reached();
            tracing::info!(total_usd, "funding goal reached");
        }
        Ok(self.state.goal_reached())
    }

    /// Refund `caller`'s entire funded balance.
    ///
    /// Gates, in order: refunds close once the goal is reached; one refund
    /// per funding cycle; the caller must have a balance. The refunded flag
    /// is checked before the balance so a double refund reports the more
    /// specific cause.
    pub fn refund(&mut self, caller: Address) -> Result<LedgerEvent, LedgerError> {
        if self.state.goal_reached() {
            return Err(LedgerError::RefundsClosed);
        }
        if self.state.refunded(&caller) {
            return Err(LedgerError::AlreadyRefunded);
        }
        let amount = self.state.amount_funded(&caller);
        if amount == 0 {
            return Err(LedgerError::NoFundsToRefund);
        }

        self.transfers.credit(&caller, amount)?;
        self.state.apply_refund(caller, amount)?;

        let event = LedgerEvent::Refund {
            funder: caller,
            amount,
        };
        self.state.push_event(event.clone());
        tracing::info!(funder = %caller, amount, "full refund issued");
        Ok(event)
    }

    /// Refund a caller-chosen partial `amount`, strictly below the funded
    /// balance and worth at least [`MIN_CUSTOM_REFUND_THRESHOLD`].
    ///
    /// Shares the three gates of [`refund`](Self::refund), then requires the
    /// amount to clear the USD minimum and to differ from the full balance
    /// (full withdrawals must go through `refund`). A partial refund still
    /// consumes the cycle's one refund: the remainder stays locked until the
    /// caller funds again.
    pub fn custom_refund(
        &mut self,
        caller: Address,
        amount: u128,
    ) -> Result<LedgerEvent, LedgerError> {
        if self.state.goal_reached() {
            return Err(LedgerError::RefundsClosed);
        }
        if self.state.refunded(&caller) {
            return Err(LedgerError::AlreadyRefunded);
        }
        let funded = self.state.amount_funded(&caller);
        if funded == 0 {
            return Err(LedgerError::NoFundsToRefund);
        }

        let usd_value = to_reference_currency(amount, self.price_feed.as_ref())?;
        if usd_value < MIN_CUSTOM_REFUND_THRESHOLD {
            return Err(LedgerError::RefundTooSmall);
        }
        if amount == funded {
            return Err(LedgerError::UseFullRefundInstead);
        }
        if amount > funded {
            return Err(LedgerError::RefundExceedsBalance);
        }

        self.transfers.credit(&caller, amount)?;
        self.state.apply_refund(caller, amount)?;

        let event = LedgerEvent::Refund {
            funder: caller,
            amount,
        };
        self.state.push_event(event.clone());
        tracing::info!(funder = %caller, amount, remainder = funded - amount, "partial refund issued");
        Ok(event)
    }

    /// Unconditional exit path: refund the caller's entire balance without
    /// the goal-reached or already-refunded gates. Still requires a balance.
    pub fn refund_all(&mut self, caller: Address) -> Result<LedgerEvent, LedgerError> {
        let amount = self.state.amount_funded(&caller);
        if amount == 0 {
            return Err(LedgerError::NoFundsToRefund);
        }

        self.transfers.credit(&caller, amount)?;
        self.state.apply_refund(caller, amount)?;

        let event = LedgerEvent::RefundAll {
            funder: caller,
            amount,
        };
        self.state.push_event(event.clone());
        tracing::info!(funder = %caller, amount, "refund-all issued");
        Ok(event)
    }

    /// Sweep the whole treasury to the owner, zeroing every contributor's
    /// balance. Owner only. Refunded flags are untouched; later refunds fail
    /// for lack of funds. Returns the swept amount.
    pub fn withdraw(&mut self, caller: Address) -> Result<u128, LedgerError> {
        self.ensure_owner(&caller)?;

        let amount = self.state.treasury_balance();
        self.transfers.credit(&caller, amount)?;
        let swept = self.state.apply_withdraw();

        tracing::info!(owner = %caller, amount = swept, "treasury withdrawn");
        Ok(swept)
    }

    /// Hand ownership to `new_owner`. Owner only; the zero address is not a
    /// valid owner.
    pub fn change_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<LedgerEvent, LedgerError> {
        self.ensure_owner(&caller)?;
        if new_owner.is_zero() {
            return Err(LedgerError::InvalidOwner);
        }

        let previous = self.state.owner();
        self.state.set_owner(new_owner);

        let event = LedgerEvent::OwnerChanged { previous, new: new_owner };
        self.state.push_event(event.clone());
        tracing::info!(%previous, %new_owner, "ownership transferred");
        Ok(event)
    }

    /// Owner gate shared by every owner-only operation
    fn ensure_owner(&self, caller: &Address) -> Result<(), LedgerError> {
        if *caller != self.state.owner() {
            return Err(LedgerError::NotOwner);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Keypair;
    use crate::oracle::{MockPriceFeed, PriceQuote};
    use crate::payout::RecordingTransfer;

    const COIN: u128 = 1_000_000_000_000_000_000;

    fn test_ledger() -> (FundingLedger, Address) {
        let owner = Keypair::generate().address();
        let feed = Arc::new(MockPriceFeed::new(PriceQuote::from_usd(2000)));
        let transfers = Arc::new(RecordingTransfer::new());
        (FundingLedger::new(owner, feed, transfers), owner)
    }

    #[test]
    fn test_fund_below_minimum_fails() {
        let (mut ledger, _) = test_ledger();
        let alice = Keypair::generate().address();

        // 0.02 coin at 2000 USD/coin is 40 USD, under the 50 USD minimum
        let result = ledger.fund(alice, COIN / 50);
        assert!(matches!(result, Err(LedgerError::InsufficientContribution)));
        assert_eq!(ledger.amount_funded(&alice), 0);
    }

    #[test]
    fn test_fund_then_refund_cycle() {
        let (mut ledger, _) = test_ledger();
        let alice = Keypair::generate().address();

        ledger.fund(alice, COIN).unwrap();
        assert_eq!(ledger.amount_funded(&alice), COIN);

        ledger.refund(alice).unwrap();
        assert_eq!(ledger.amount_funded(&alice), 0);
        assert!(ledger.refunded(&alice));

        // A fresh fund reopens the refund cycle
        ledger.fund(alice, COIN).unwrap();
        assert!(!ledger.refunded(&alice));
    }

    #[test]
    fn test_owner_gate() {
        let (mut ledger, owner) = test_ledger();
        let mallory = Keypair::generate().address();

        assert!(matches!(
            ledger.update_goal(mallory, 6000),
            Err(LedgerError::NotOwner)
        ));
        ledger.update_goal(owner, 6000).unwrap();
        assert_eq!(ledger.funding_goal(), 6000 * SCALING_FACTOR);
    }
}
