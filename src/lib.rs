//! Market data, persistence helpers and the classifier used by the copper
//! direction forecast.

pub mod core;
pub mod errors;
pub mod models;

pub use errors::ForecastError;
pub use self::core::io::{OhlcSeries, PricePoint};
