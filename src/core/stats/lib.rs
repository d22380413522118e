// ============================================================================
// Descriptive statistics on f64 slices
// ============================================================================

/// Delta degrees of freedom used by the variance estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ddof {
    /// Divide by n (population estimate).
    Population,
    /// Divide by n - 1 (sample estimate).
    Sample,
}

impl Ddof {
    fn divisor(self, n: usize) -> Option<f64> {
        match self {
            Ddof::Population if n >= 1 => Some(n as f64),
            Ddof::Sample if n >= 2 => Some((n - 1) as f64),
            _ => None,
        }
    }
}

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Variance around the mean. NaN when the slice is too short for `ddof`.
pub fn variance(data: &[f64], ddof: Ddof) -> f64 {
    let Some(divisor) = ddof.divisor(data.len()) else {
        return f64::NAN;
    };
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / divisor
}

pub fn std_dev(data: &[f64], ddof: Ddof) -> f64 {
    variance(data, ddof).sqrt()
}

// ============================================================================
// Column statistics over row-major matrices
// ============================================================================

/// Mean and standard deviation of column `col` of `rows`.
pub fn column_mean_std(rows: &[Vec<f64>], col: usize, ddof: Ddof) -> (f64, f64) {
    let values: Vec<f64> = rows.iter().map(|row| row[col]).collect();
    (mean(&values), std_dev(&values, ddof))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data) - 5.0).abs() < 1e-12);
        assert!((variance(&data, Ddof::Population) - 4.0).abs() < 1e-12);
        assert!((std_dev(&data, Ddof::Population) - 2.0).abs() < 1e-12);
        assert!((variance(&data, Ddof::Sample) - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(mean(&[]).is_nan());
        assert!(variance(&[1.0], Ddof::Sample).is_nan());
        assert_eq!(variance(&[1.0], Ddof::Population), 0.0);
    }

    #[test]
    fn test_column_mean_std() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let (m, s) = column_mean_std(&rows, 0, Ddof::Population);
        assert!((m - 2.0).abs() < 1e-12);
        assert!((s - 1.0).abs() < 1e-12);
        let (_, s) = column_mean_std(&rows, 1, Ddof::Population);
        assert_eq!(s, 0.0);
    }
}
