//! Historical price data.
//!
//! [`PriceSeries`] is the read-only input every other component consumes.
//! [`PriceDataSource`] is the port through which it is fetched.

mod series;
mod source;

pub use series::{PricePoint, PriceSeries};
pub use source::{
    InMemoryPriceSource, JsonFilePriceSource, PriceDataSource, PriceRecord, SYMBOL_PLACEHOLDER,
};
