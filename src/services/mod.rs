pub mod classifier;
pub mod database;
pub mod detail;
pub mod fx;
pub mod provider;
pub mod resampler;
pub mod yahoo;

pub use database::RegionalDatabaseBuilder;
pub use detail::StockDetailService;
pub use fx::CurrencyNormalizer;
pub use provider::MarketDataSource;
pub use yahoo::YahooClient;
