use anyhow::{Context, Result};
use copper_forecast::OhlcSeries;
use log::info;

// Re-export from shared I/O modules
pub use copper_forecast::core::io::{load_ohlcv, read_ohlcv};

use crate::config::Config;
use crate::features::{EnrichedSeries, compute_indicators};

/// Load the configured data file, restricted to the configured date range.
pub fn load_series(config: &Config) -> Result<OhlcSeries> {
    let series = load_ohlcv(&config.data_file)
        .with_context(|| format!("Failed to load market data: {}", config.data_file.display()))?;
    let series = series.between(config.start_date, config.end_date);
    info!("{}: {} rows in range", config.ticker, series.len());
    Ok(series)
}

/// Load the configured data and derive its indicator columns.
pub fn load_enriched(config: &Config) -> Result<EnrichedSeries> {
    let series = load_series(config)?;
    let enriched = compute_indicators(&series, config.rsi_zero_loss)
        .context("Failed to compute indicators")?;
    info!("{} rows after indicator warm-up", enriched.len());
    Ok(enriched)
}
