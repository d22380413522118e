use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::BacktestResult;

/// Generate a text report
pub fn generate_text_report<P: AsRef<Path>>(result: &BacktestResult, path: P) -> Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "Backtest Report")?;
    writeln!(file, "===============")?;
    writeln!(file)?;
    writeln!(file, "Periods: {}", result.len())?;
    writeln!(file, "Compounding: {}", result.compounding)?;
    writeln!(file, "Strategy Performance: {:.2}%", result.final_strategy_pct())?;
    writeln!(file, "Market Performance: {:.2}%", result.final_market_pct())?;
    writeln!(file)?;

    for (title, metrics) in [
        ("Strategy Metrics:", &result.metrics),
        ("Buy & Hold Metrics:", &result.market_metrics),
    ] {
        writeln!(file, "{title}")?;
        writeln!(file, "--------------------")?;

        // Sort keys for consistent output
        let mut keys: Vec<&String> = metrics.keys().collect();
        keys.sort();

        for key in keys {
            writeln!(file, "{}: {:.4}", key, metrics[key])?;
        }
        writeln!(file)?;
    }

    Ok(())
}

/// Generate a JSON report
pub fn generate_json_report<P: AsRef<Path>>(result: &BacktestResult, path: P) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, result)?;
    Ok(())
}
