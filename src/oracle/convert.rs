// Price conversion - native amounts into reference-currency (USD-scale) amounts
// Integer arithmetic only; rounding always truncates toward zero

use crate::oracle::{FeedError, PriceFeed, PriceQuote};
use thiserror::Error;

/// Fixed-point scale shared by all reference-currency amounts: 1 USD = 10^18 units
pub const SCALING_FACTOR: u128 = 1_000_000_000_000_000_000;

const TARGET_DECIMALS: u32 = 18;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("Price conversion overflowed")]
    Overflow,
}

/// Convert `native_amount` (smallest native units) into USD-scale units using
/// the feed's current quote.
///
/// Re-reads the oracle on every call; nothing is cached, so two conversions
/// of the same amount can legitimately differ between operations.
pub fn to_reference_currency(
    native_amount: u128,
    feed: &dyn PriceFeed,
) -> Result<u128, ConvertError> {
    let quote = feed.latest_price()?;
    let normalized = normalize_price(quote)?;

    let product = native_amount
        .checked_mul(normalized)
        .ok_or(ConvertError::Overflow)?;
    Ok(product / SCALING_FACTOR)
}

/// Rescale a quote to the 18-decimal fixed-point used by the ledger
fn normalize_price(quote: PriceQuote) -> Result<u128, ConvertError> {
    if quote.price() <= 0 {
        return Err(FeedError::NonPositivePrice(quote.price()).into());
    }
    let price = quote.price() as u128;
    let decimals = quote.decimals() as u32;

    if decimals <= TARGET_DECIMALS {
        let factor = 10u128
            .checked_pow(TARGET_DECIMALS - decimals)
            .ok_or(ConvertError::Overflow)?;
        price.checked_mul(factor).ok_or(ConvertError::Overflow)
    } else {
        // Feed is more precise than the ledger scale; truncate the excess
        let factor = 10u128
            .checked_pow(decimals - TARGET_DECIMALS)
            .ok_or(ConvertError::Overflow)?;
        Ok(price / factor)
    }
}
