// Oracle module - price feed seam and fixed-point USD conversion

mod convert;
mod feed;

pub use convert::{to_reference_currency, ConvertError, SCALING_FACTOR};
pub use feed::{FeedError, MockPriceFeed, PriceFeed, PriceQuote, StaticPriceFeed};
