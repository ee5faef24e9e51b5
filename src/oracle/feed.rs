// Price feed - the external oracle supplying the native/reference exchange rate
// The ledger only ever sees this trait; live feeds stay outside the crate

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Price feed unavailable: {0}")]
    Unavailable(String),

    #[error("Price feed returned a non-positive price: {0}")]
    NonPositivePrice(i128),
}

/// A price observation: integer price plus its decimal scale.
///
/// A quote of `price = 2000_00000000, decimals = 8` means one native coin
/// is worth 2000 reference units (USD).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    price: i128,
    decimals: u8,
}

impl PriceQuote {
    /// Create a quote from a raw price and its decimal scale
    pub fn new(price: i128, decimals: u8) -> Self {
        Self { price, decimals }
    }

    /// Quote for a whole-USD price per native coin at the usual 8-decimal feed scale
    pub fn from_usd(usd_per_coin: u64) -> Self {
        Self::new(usd_per_coin as i128 * 100_000_000, 8)
    }

    /// The raw integer price
    pub fn price(&self) -> i128 {
        self.price
    }

    /// Number of decimals in the raw price
    pub fn decimals(&self) -> u8 {
        self.decimals
    }
}

// ============================================================================
// PRICE FEED TRAIT
// ============================================================================

/// Trait for price oracles.
///
/// `latest_price` is synchronous and fallible: the feed either answers
/// immediately or signals unavailability. No retries happen here.
pub trait PriceFeed: Send + Sync {
    /// The oracle's current price observation
    fn latest_price(&self) -> Result<PriceQuote, FeedError>;
}

// ============================================================================
// STATIC PRICE FEED
// ============================================================================

/// Feed that always returns a fixed quote.
///
/// Used by the CLI, where the quote is configured at init time and updated
/// explicitly; also handy in tests that don't need failure injection.
#[derive(Clone, Debug)]
pub struct StaticPriceFeed {
    quote: PriceQuote,
}

impl StaticPriceFeed {
    /// Create a feed pinned to the given quote
    pub fn new(quote: PriceQuote) -> Self {
        Self { quote }
    }
}

impl PriceFeed for StaticPriceFeed {
    fn latest_price(&self) -> Result<PriceQuote, FeedError> {
        Ok(self.quote)
    }
}

// ============================================================================
// MOCK PRICE FEED
// ============================================================================

/// Mock implementation of PriceFeed for testing
pub struct MockPriceFeed {
    quote: Mutex<PriceQuote>,
    failure: Mutex<Option<String>>,
    call_count: AtomicUsize,
}

impl MockPriceFeed {
    /// Create a mock that answers with the given quote
    pub fn new(quote: PriceQuote) -> Self {
        Self {
            quote: Mutex::new(quote),
            failure: Mutex::new(None),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Configure to fail every read with a message
    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Change the quote returned by subsequent reads
    pub fn set_quote(&self, quote: PriceQuote) {
        *self.quote.lock().unwrap() = quote;
    }

    /// Start failing reads (simulates a stale/unreachable oracle)
    pub fn set_unavailable(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Resume answering reads
    pub fn set_available(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Number of reads served or rejected so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl PriceFeed for MockPriceFeed {
    fn latest_price(&self) -> Result<PriceQuote, FeedError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(FeedError::Unavailable(message));
        }

        Ok(*self.quote.lock().unwrap())
    }
}
