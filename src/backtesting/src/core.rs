use log::debug;

use crate::metrics::calculate_metrics;
use crate::models::{BacktestError, BacktestResult, Compounding};

/// Positions actually held, one per period.
///
/// A signal observed at period `i` can only be traded from period `i + 1`,
/// so `position[i] = prediction[i - 1]` and the first period is always flat.
pub fn positions(predictions: &[u8]) -> Result<Vec<u8>, BacktestError> {
    if let Some((index, &value)) = predictions.iter().enumerate().find(|(_, p)| **p > 1) {
        return Err(BacktestError::InvalidSignal { index, value });
    }

    let mut held = Vec::with_capacity(predictions.len());
    if !predictions.is_empty() {
        held.push(0);
        held.extend_from_slice(&predictions[..predictions.len() - 1]);
    }
    Ok(held)
}

/// Strategy return booked at each period.
///
/// `returns[i]` is the forward return of row `i` (close `i` to close `i + 1`),
/// i.e. what was earned by acting on `predictions[i]`. Combined with the
/// one-period execution delay this books `predictions[i - 1] * returns[i - 1]`
/// at period `i`. The first period has no earlier signal and books 0, so the
/// output has the same length as the inputs.
pub fn strategy_returns(predictions: &[u8], returns: &[f64]) -> Result<Vec<f64>, BacktestError> {
    if predictions.len() != returns.len() {
        return Err(BacktestError::LengthMismatch {
            predictions: predictions.len(),
            returns: returns.len(),
        });
    }

    let held = positions(predictions)?;
    Ok(held
        .iter()
        .enumerate()
        .map(|(i, &pos)| if i == 0 { 0.0 } else { f64::from(pos) * returns[i - 1] })
        .collect())
}

/// Accumulate per-period returns into a curve.
pub fn cumulate(period_returns: &[f64], compounding: Compounding) -> Vec<f64> {
    match compounding {
        Compounding::Additive => period_returns
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect(),
        Compounding::Multiplicative => period_returns
            .iter()
            .scan(1.0, |acc, r| {
                *acc *= 1.0 + r;
                Some(*acc)
            })
            .collect(),
    }
}

/// Cumulative strategy curve for a long-only model (1 = long, 0 = flat).
pub fn simulate(
    predictions: &[u8],
    returns: &[f64],
    compounding: Compounding,
) -> Result<Vec<f64>, BacktestError> {
    let booked = strategy_returns(predictions, returns)?;
    Ok(cumulate(&booked, compounding))
}

/// Benchmark curve: same booking rule with the position fixed at long.
pub fn buy_and_hold(returns: &[f64], compounding: Compounding) -> Vec<f64> {
    let booked: Vec<f64> = (0..returns.len())
        .map(|i| if i == 0 { 0.0 } else { returns[i - 1] })
        .collect();
    cumulate(&booked, compounding)
}

/// Run the strategy and the buy-and-hold benchmark side by side.
pub fn run_backtest(
    predictions: &[u8],
    returns: &[f64],
    compounding: Compounding,
) -> Result<BacktestResult, BacktestError> {
    let held = positions(predictions)?;
    let strategy = strategy_returns(predictions, returns)?;
    let market = strategy_returns(&vec![1; returns.len()], returns)?;

    let mut metrics = calculate_metrics(&strategy, 0.0);
    let exposure = if held.is_empty() {
        0.0
    } else {
        held.iter().filter(|&&p| p == 1).count() as f64 / held.len() as f64
    };
    metrics.insert("Exposure".to_string(), exposure);
    let market_metrics = calculate_metrics(&market, 0.0);

    let result = BacktestResult {
        compounding,
        positions: held,
        strategy_curve: cumulate(&strategy, compounding),
        market_curve: cumulate(&market, compounding),
        strategy_returns: strategy,
        market_returns: market,
        metrics,
        market_metrics,
    };

    debug!(
        "backtest over {} periods: strategy {:.2}%, market {:.2}%",
        result.len(),
        result.final_strategy_pct(),
        result.final_market_pct()
    );

    Ok(result)
}
