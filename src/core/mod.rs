//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod log;
pub mod pair;
pub mod rate;

// Re-export main types for cleaner imports
pub use currency::{FetchError, RateSource};
pub use pair::CurrencyPair;
pub use rate::{MissingRatePolicy, RateMapping, RateRecord, RateSnapshot};
