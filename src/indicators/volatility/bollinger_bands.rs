use stats::Ddof;

use crate::trend::ma::moving_average;
use crate::volatility::volatility::rolling_std;

/// Bollinger Bands Output
#[derive(Debug, Clone)]
pub struct BollingerBandsOutput {
    /// Upper Band = Middle Band + (Multiplier * SD)
    pub upper_band: Vec<f64>,
    /// Middle Band = SMA
    pub middle_band: Vec<f64>,
    /// Lower Band = Middle Band - (Multiplier * SD)
    pub lower_band: Vec<f64>,
}

/// Computes Bollinger Bands.
///
/// # Arguments
///
/// * `data` - A slice of f64 values (typically closing prices).
/// * `period` - The window size for the moving average and standard deviation (typically 20).
/// * `multiplier` - The number of standard deviations for the bands (typically 2.0).
/// * `ddof` - Which standard deviation estimator to use for the band width.
pub fn bollinger_bands(
    data: &[f64],
    period: usize,
    multiplier: f64,
    ddof: Ddof,
) -> BollingerBandsOutput {
    let middle_band = moving_average(data, period);
    let std_dev = rolling_std(data, period, ddof);

    let upper_band = middle_band
        .iter()
        .zip(std_dev.iter())
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower_band = middle_band
        .iter()
        .zip(std_dev.iter())
        .map(|(m, s)| m - multiplier * s)
        .collect();

    BollingerBandsOutput {
        upper_band,
        middle_band,
        lower_band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_bands() {
        let data = vec![
            10.0, 10.0, 10.0, 10.0, 10.0,
            12.0, 12.0, 12.0, 12.0, 12.0,
        ];
        let period = 5;
        let multiplier = 2.0;

        let output = bollinger_bands(&data, period, multiplier, Ddof::Population);

        assert_eq!(output.middle_band.len(), 10);

        // First 4 should be NaN
        assert!(output.middle_band[3].is_nan());
        assert!(output.upper_band[3].is_nan());
        assert!(output.lower_band[3].is_nan());

        // Index 4: [10, 10, 10, 10, 10] -> Mean 10, StdDev 0
        assert!((output.middle_band[4] - 10.0).abs() < 1e-10);
        assert!((output.upper_band[4] - 10.0).abs() < 1e-10);
        assert!((output.lower_band[4] - 10.0).abs() < 1e-10);

        // Index 9: [12, 12, 12, 12, 12] -> Mean 12, StdDev 0
        assert!((output.middle_band[9] - 12.0).abs() < 1e-10);
        assert!((output.upper_band[9] - 12.0).abs() < 1e-10);
        assert!((output.lower_band[9] - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_bollinger_bands_variation() {
        let data = vec![10.0, 12.0, 14.0, 16.0, 18.0];
        let period = 5;
        let multiplier = 2.0;

        let population = bollinger_bands(&data, period, multiplier, Ddof::Population);
        let sample = bollinger_bands(&data, period, multiplier, Ddof::Sample);

        // Mean = 14, squared deviations sum to 40
        let mean = 14.0;
        let pop_sd = 8.0_f64.sqrt(); // 40 / 5
        let sample_sd = 10.0_f64.sqrt(); // 40 / 4

        assert!((population.middle_band[4] - mean).abs() < 1e-10);
        assert!((population.upper_band[4] - (mean + multiplier * pop_sd)).abs() < 1e-10);
        assert!((population.lower_band[4] - (mean - multiplier * pop_sd)).abs() < 1e-10);
        assert!((sample.upper_band[4] - (mean + multiplier * sample_sd)).abs() < 1e-10);
        assert!((sample.lower_band[4] - (mean - multiplier * sample_sd)).abs() < 1e-10);
    }
}
