use anyhow::{Context, Result};
use backtesting::{BacktestResult, Compounding, run_backtest};
use chrono::NaiveDate;
use copper_forecast::ForecastError;
use copper_forecast::core::io::write_atomic;
use log::info;
use std::path::Path;

use crate::dataset::PreparedData;

/// Backtest test-window predictions against the test forward returns.
pub fn backtest_predictions(
    predictions: &[u8],
    data: &PreparedData,
    compounding: Compounding,
) -> Result<BacktestResult> {
    let result = run_backtest(predictions, &data.test_returns, compounding)
        .context("Backtest failed")?;
    info!(
        "Backtest over {} periods: strategy {:.2}%, market {:.2}%",
        result.len(),
        result.final_strategy_pct(),
        result.final_market_pct()
    );
    Ok(result)
}

/// Dump both cumulative curves, one row per test date.
pub fn write_curves_csv<P: AsRef<Path>>(
    path: P,
    timestamps: &[NaiveDate],
    strategy: &[f64],
    market: &[f64],
) -> Result<(), ForecastError> {
    if timestamps.len() != strategy.len() || strategy.len() != market.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "curve lengths differ: {} dates, {} strategy, {} market",
            timestamps.len(),
            strategy.len(),
            market.len()
        )));
    }

    write_atomic(path, |w| {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(["date", "strategy", "market"])?;
        for ((date, s), m) in timestamps.iter().zip(strategy).zip(market) {
            wtr.write_record([date.format("%Y-%m-%d").to_string(), s.to_string(), m.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_curves_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curves.csv");
        let dates: Vec<NaiveDate> = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap())
            .collect();

        write_curves_csv(&path, &dates, &[0.0, 0.01, 0.03], &[0.0, 0.02, 0.01]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "2024-05-01");
        assert_eq!(rows[2][1].parse::<f64>().unwrap(), 0.03);

        assert!(write_curves_csv(&path, &dates, &[0.0], &[0.0]).is_err());
    }
}
