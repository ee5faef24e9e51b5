// Ledger state - the serializable funding aggregate
// Mutations happen only through FundingLedger operations; each helper here
// either fully applies or leaves the state untouched

use crate::identity::Address;
use crate::ledger::records::{Contribution, EventRecord, LedgerEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from state encoding/decoding
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Deserialization failed")]
    DeserializationFailed,
}

/// Arithmetic overflow while applying a mutation; nothing was changed
#[derive(Debug)]
pub(crate) struct ArithmeticOverflow;

/// The whole funding ledger as plain data: owner, contributor registry,
/// goal state, held treasury, and the event log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerState {
    /// Single address with authority over withdraw and ownership transfer
    owner: Address,
    /// Every funding call's caller, in order; duplicates allowed
    funders: Vec<Address>,
    /// Per-contributor records, created lazily and never deleted
    contributions: HashMap<Address, Contribution>,
    /// Funding goal in USD-scale units
    funding_goal: u128,
    /// One-way flag set by goal checks; never resets
    goal_reached: bool,
    /// Native units currently held in custody
    treasury: u128,
    /// Append-only log of emitted events
    events: Vec<EventRecord>,
}

impl LedgerState {
    /// Create a fresh ledger owned by `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            funders: Vec::new(),
            contributions: HashMap::new(),
            funding_goal: 0,
            goal_reached: false,
            treasury: 0,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Funding goal in USD-scale units
    pub fn funding_goal(&self) -> u128 {
        self.funding_goal
    }

    /// Whether a goal check has ever found the goal met
    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    /// Native units currently held in custody
    pub fn treasury_balance(&self) -> u128 {
        self.treasury
    }

    /// Native units funded by `address` in the current cycle
    pub fn amount_funded(&self, address: &Address) -> u128 {
        self.contributions
            .get(address)
            .map(Contribution::amount_funded)
            .unwrap_or(0)
    }

    /// Whether `address` already refunded in its current cycle
    pub fn refunded(&self, address: &Address) -> bool {
        self.contributions
            .get(address)
            .map(Contribution::refunded)
            .unwrap_or(false)
    }

    /// Funder at `index` in funding order
    pub fn funder(&self, index: usize) -> Option<Address> {
        self.funders.get(index).copied()
    }

    /// Number of funding calls recorded (duplicates included)
    pub fn funder_count(&self) -> usize {
        self.funders.len()
    }

    /// All funding calls' callers, in order
    pub fn funders(&self) -> &[Address] {
        &self.funders
    }

    /// Sum of every contributor's funded amount.
    /// Equals the treasury balance at every operation boundary.
    pub fn total_funded(&self) -> u128 {
        self.contributions
            .values()
            .map(Contribution::amount_funded)
            .sum()
    }

    /// The emitted-event log, oldest first
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    // ========================================================================
    // MUTATIONS (crate-internal, driven by FundingLedger)
    // ========================================================================

    /// Record a contribution: accumulate the amount, clear a stale refunded
    /// flag, append the caller to the funder registry, grow the treasury.
    pub(crate) fn apply_fund(
        &mut self,
        caller: Address,
        value: u128,
    ) -> Result<(), ArithmeticOverflow> {
        let new_amount = self
            .amount_funded(&caller)
            .checked_add(value)
            .ok_or(ArithmeticOverflow)?;
        let new_treasury = self.treasury.checked_add(value).ok_or(ArithmeticOverflow)?;

        let record = self.contributions.entry(caller).or_default();
        record.set_amount_funded(new_amount);
        record.set_refunded(false);
        self.funders.push(caller);
        self.treasury = new_treasury;
        Ok(())
    }

    /// Return `amount` to `caller`'s cycle: shrink the balance and treasury,
    /// mark the contributor refunded. Callers guarantee `amount` does not
    /// exceed the funded balance.
    pub(crate) fn apply_refund(
        &mut self,
        caller: Address,
        amount: u128,
    ) -> Result<(), ArithmeticOverflow> {
        let new_amount = self
            .amount_funded(&caller)
            .checked_sub(amount)
            .ok_or(ArithmeticOverflow)?;
        let new_treasury = self.treasury.checked_sub(amount).ok_or(ArithmeticOverflow)?;

        let record = self.contributions.entry(caller).or_default();
        record.set_amount_funded(new_amount);
        record.set_refunded(true);
        self.treasury = new_treasury;
        Ok(())
    }

    /// Sweep the treasury: zero every contribution and the held balance.
    /// Refunded flags are left as they are. Returns the swept amount.
    pub(crate) fn apply_withdraw(&mut self) -> u128 {
        for record in self.contributions.values_mut() {
            record.set_amount_funded(0);
        }
        let swept = self.treasury;
        self.treasury = 0;
        swept
    }

    pub(crate) fn set_owner(&mut self, owner: Address) {
        self.owner = owner;
    }

    pub(crate) fn set_funding_goal(&mut self, goal: u128) {
        self.funding_goal = goal;
    }

    pub(crate) fn mark_goal_reached(&mut self) {
        self.goal_reached = true;
    }

    pub(crate) fn push_event(&mut self, event: LedgerEvent) {
        self.events.push(EventRecord::new(event));
    }

    // ========================================================================
    // CODEC
    // ========================================================================

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        postcard::to_allocvec(self).unwrap_or_default()
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        postcard::from_bytes(bytes).map_err(|_| StateError::DeserializationFailed)
    }
}
