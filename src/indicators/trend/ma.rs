/// Calculates the Simple Moving Average (SMA) for a given data slice and number of lags.
///
/// # Arguments
///
/// * `data` - A slice of f64 values.
/// * `lags` - The window size for the moving average.
///
/// # Returns
///
/// A Vec<f64> containing the SMA values. The first `lags - 1` values are NaN.
pub fn moving_average(data: &[f64], lags: usize) -> Vec<f64> {
    if lags == 0 || lags > data.len() {
        return vec![f64::NAN; data.len()];
    }

    let mut sma = Vec::with_capacity(data.len());

    // Pad with NaN for the initial period where we don't have enough data
    for _ in 0..lags - 1 {
        sma.push(f64::NAN);
    }

    // Summed per window: a NaN only poisons the windows that contain it.
    for end in lags..=data.len() {
        let window = &data[end - lags..end];
        sma.push(window.iter().sum::<f64>() / lags as f64);
    }

    sma
}

/// Exponential moving average with smoothing factor `alpha = 2 / (span + 1)`.
///
/// The recursion is seeded with the first finite value rather than with a
/// simple average, so the output is defined from that position onward:
/// `ema[0] = x[0]`, `ema[i] = alpha * x[i] + (1 - alpha) * ema[i - 1]`.
/// Leading NaNs in `data` are carried through as NaN.
pub fn exponential_moving_average(data: &[f64], span: usize) -> Vec<f64> {
    let mut ema = vec![f64::NAN; data.len()];
    if span == 0 {
        return ema;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let Some(seed_idx) = data.iter().position(|x| x.is_finite()) else {
        return ema;
    };

    let mut prev = data[seed_idx];
    ema[seed_idx] = prev;
    for i in seed_idx + 1..data.len() {
        prev = alpha * data[i] + (1.0 - alpha) * prev;
        ema[i] = prev;
    }

    ema
}
