mod company;
mod ohlc;
mod period;
mod quote;
mod region;
mod registry;

pub use company::{
    CompanyRecord, PlaceholderKind, PlaceholderRecord, RegionDatabase, Tier, TickerOutcome,
};
pub use ohlc::OhlcBar;
pub use period::PeriodToken;
pub use quote::{QuoteSnapshot, StockQuote};
pub use region::Region;
pub use registry::{Registries, RegistryEntry};
