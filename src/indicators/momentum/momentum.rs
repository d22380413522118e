/// Momentum: `data[i] - data[i - period]`. The first `period` values are NaN.
pub fn momentum(data: &[f64], period: usize) -> Vec<f64> {
    lagged(data, period, |current, past| current - past)
}

/// Rate of change as a fraction: `data[i] / data[i - period] - 1`.
///
/// A zero reference price yields a non-finite value, which callers treat the
/// same way as warm-up NaNs.
pub fn rate_of_change(data: &[f64], period: usize) -> Vec<f64> {
    lagged(data, period, |current, past| current / past - 1.0)
}

fn lagged(data: &[f64], period: usize, f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    let n = data.len();
    if period == 0 {
        return vec![f64::NAN; n];
    }

    (0..n)
        .map(|i| if i < period { f64::NAN } else { f(data[i], data[i - period]) })
        .collect()
}
