/// RSI values plus the positions where the average loss was exactly zero.
#[derive(Debug, Clone)]
pub struct RsiOutput {
    /// RSI in the [0, 100] range, NaN where undefined.
    pub values: Vec<f64>,
    /// Indices whose window contained no losing period (RS undefined).
    pub zero_loss: Vec<usize>,
}

/// Compute RSI (Relative Strength Index) indicator
///
/// RSI is a momentum oscillator that measures the speed and magnitude of price changes.
/// Formula used here (simple averages, no Wilder smoothing):
/// - delta[i] = price[i] - price[i - 1]
/// - avg_gain = mean of positive deltas over the last `period` deltas
/// - avg_loss = mean of |negative deltas| over the last `period` deltas
/// - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
///
/// The first defined value is at index `period`. When `avg_loss` is zero the
/// ratio is undefined. With `clamp_zero_loss` the value is clamped to 100
/// (or 50 for a completely flat window); otherwise it is left as NaN. Either
/// way the index is reported in `zero_loss`.
///
/// # Arguments
/// * `prices` - Price data
/// * `period` - RSI lookback period (typically 14)
/// * `clamp_zero_loss` - Clamp instead of emitting NaN for zero average loss
pub fn rsi(prices: &[f64], period: usize, clamp_zero_loss: bool) -> RsiOutput {
    let n = prices.len();
    let mut values = vec![f64::NAN; n];
    let mut zero_loss = Vec::new();

    if period == 0 || n <= period {
        return RsiOutput { values, zero_loss };
    }

    for (current_idx, rsi_val) in values.iter_mut().enumerate().skip(period) {
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for j in current_idx + 1 - period..=current_idx {
            let change = prices[j] - prices[j - 1];
            if change > 0.0 {
                avg_gain += change;
            } else if change < 0.0 {
                avg_loss -= change; // Store as positive value
            }
        }

        avg_gain /= period as f64;
        avg_loss /= period as f64;

        if avg_loss == 0.0 {
            zero_loss.push(current_idx);
            if clamp_zero_loss {
                // No price movement at all reads as neutral
                *rsi_val = if avg_gain == 0.0 { 50.0 } else { 100.0 };
            }
            continue;
        }

        let rs = avg_gain / avg_loss;
        *rsi_val = 100.0 - (100.0 / (1.0 + rs));
    }

    RsiOutput { values, zero_loss }
}
