use crate::trend::ma::exponential_moving_average;

/// MACD (Moving Average Convergence Divergence) Output
#[derive(Debug, Clone)]
pub struct MacdOutput {
    /// MACD Line = Fast EMA - Slow EMA
    pub macd_line: Vec<f64>,
    /// Signal Line = EMA of MACD Line
    pub signal_line: Vec<f64>,
}

/// Computes the MACD indicator.
///
/// Both EMAs are seeded with the first price, so unlike a simple-average
/// seeded MACD every position is defined.
///
/// # Arguments
///
/// * `data` - A slice of f64 values (typically closing prices).
/// * `fast_period` - The span for the fast EMA (typically 12).
/// * `slow_period` - The span for the slow EMA (typically 26).
/// * `signal_period` - The span for the signal line EMA (typically 9).
pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdOutput {
    let fast_ema = exponential_moving_average(data, fast_period);
    let slow_ema = exponential_moving_average(data, slow_period);

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = exponential_moving_average(&macd_line, signal_period);

    MacdOutput {
        macd_line,
        signal_line,
    }
}
