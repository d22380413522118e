use stats::{Ddof, std_dev};

/// Rolling standard deviation over a trailing window of `period` values.
///
/// Position `i` covers `data[i + 1 - period..=i]`; the first `period - 1`
/// positions are NaN. `Ddof::Sample` matches the usual "volatility" column
/// of a price table, `Ddof::Population` the classic Bollinger definition.
pub fn rolling_std(data: &[f64], period: usize, ddof: Ddof) -> Vec<f64> {
    let n = data.len();
    if period == 0 || period > n {
        return vec![f64::NAN; n];
    }

    let mut out = vec![f64::NAN; period - 1];
    out.extend(data.windows(period).map(|w| std_dev(w, ddof)));
    out
}
