use crate::errors::ForecastError;

/// Compute simple returns from prices
///
/// # Arguments
/// * `prices` - Raw price data (not log-transformed)
///
/// # Returns
/// Vector of returns: (price[i+1] - price[i]) / price[i], one shorter than `prices`
pub fn compute_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Forward returns for rows `start..end` of `prices`.
///
/// Entry k is the return earned by holding from `prices[start + k]` to the
/// next price, i.e. `prices[start + k + 1] / prices[start + k] - 1`.
/// Requires `end < prices.len()` so every row has a successor, and every
/// return in the range to be finite.
pub fn forward_returns(prices: &[f64], start: usize, end: usize) -> Result<Vec<f64>, ForecastError> {
    if start > end {
        return Err(ForecastError::InvalidParameter(format!(
            "forward return range {start}..{end} is reversed"
        )));
    }
    if end >= prices.len() {
        return Err(ForecastError::insufficient("forward returns", end + 1, prices.len()));
    }
    let returns = compute_returns(&prices[start..=end]);
    if let Some(k) = returns.iter().position(|r| !r.is_finite()) {
        return Err(ForecastError::InvalidData {
            row: start + k,
            reason: format!(
                "return from {} to {} is not finite",
                prices[start + k],
                prices[start + k + 1]
            ),
        });
    }
    Ok(returns)
}

/// Order-preserving split point: `floor(n * (1 - test_fraction))`.
///
/// Rows before the index are training rows, the rest are test rows. Both
/// sides must be non-empty.
pub fn split_index(n: usize, test_fraction: f64) -> Result<usize, ForecastError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "test_fraction must lie strictly between 0 and 1, got {test_fraction}"
        )));
    }

    let split = (n as f64 * (1.0 - test_fraction)).floor() as usize;
    if split == 0 || split >= n {
        // One row on each side is the least a split can work with.
        return Err(ForecastError::insufficient("train/test split", 2, n));
    }
    Ok(split)
}
