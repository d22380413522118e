use chrono::NaiveDate;
use copper_forecast::{ForecastError, OhlcSeries, PricePoint};
use indicators::{bollinger_bands, macd, momentum, moving_average, rate_of_change, rolling_std, rsi};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use stats::Ddof;

/// Derived columns, in the order they appear in every feature row.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "ma20",
    "ma50",
    "volatility_20d",
    "rsi_14",
    "bb_upper",
    "bb_lower",
    "momentum_10d",
    "roc_10d",
    "macd",
    "macd_signal",
];

pub const N_FEATURES: usize = 10;

/// Longest indicator window; the first `WARMUP - 1` rows never survive.
pub const WARMUP: usize = 50;

const SHORT_WINDOW: usize = 20;
const RSI_PERIOD: usize = 14;
const MOMENTUM_PERIOD: usize = 10;
const BAND_WIDTH: f64 = 2.0;

/// What to do when a 14-day RSI window has no losing day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroLossPolicy {
    /// 100 when the window gained, 50 when it was flat.
    #[default]
    Clamp,
    /// Leave RSI undefined so the row is dropped.
    Drop,
    /// Fail with `UndefinedIndicator`.
    Reject,
}

impl std::str::FromStr for ZeroLossPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(ZeroLossPolicy::Clamp),
            "drop" => Ok(ZeroLossPolicy::Drop),
            "reject" => Ok(ZeroLossPolicy::Reject),
            other => Err(format!("unknown RSI zero-loss policy: {other}")),
        }
    }
}

/// Price rows that survived the warm-up, each with its ten derived values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    points: Vec<PricePoint>,
    features: Vec<[f64; N_FEATURES]>,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn features(&self) -> &[[f64; N_FEATURES]] {
        &self.features
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Values of one derived column, looked up by name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = FEATURE_NAMES.iter().position(|&n| n == name)?;
        Some(self.features.iter().map(|row| row[idx]).collect())
    }

    /// Feature rows `range` as owned vectors, the shape classifiers consume.
    pub fn feature_matrix(&self, range: std::ops::Range<usize>) -> Vec<Vec<f64>> {
        self.features[range].iter().map(|row| row.to_vec()).collect()
    }

    /// Most recent row and its features.
    pub fn last(&self) -> Option<(&PricePoint, &[f64; N_FEATURES])> {
        Some((self.points.last()?, self.features.last()?))
    }
}

/// [`compute_indicators`] with the default RSI policy.
pub fn compute_indicators_default(series: &OhlcSeries) -> Result<EnrichedSeries, ForecastError> {
    compute_indicators(series, ZeroLossPolicy::Clamp)
}

/// Derive the ten indicator columns from closing prices.
///
/// Every value at row `i` is computed from rows `0..=i` only. Rows with any
/// undefined value (warm-up, or RSI under `ZeroLossPolicy::Drop`) are removed,
/// so under `Clamp` the output has `len - 49` rows.
pub fn compute_indicators(series: &OhlcSeries, policy: ZeroLossPolicy) -> Result<EnrichedSeries, ForecastError> {
    let n = series.len();
    if n < WARMUP {
        return Err(ForecastError::insufficient("indicators", WARMUP, n));
    }

    let closes = series.closes();

    // The band centre is the 20-period SMA.
    let bands = bollinger_bands(&closes, SHORT_WINDOW, BAND_WIDTH, Ddof::Sample);
    let ma50 = moving_average(&closes, WARMUP);
    let vol20 = rolling_std(&closes, SHORT_WINDOW, Ddof::Sample);
    let rsi14 = rsi(&closes, RSI_PERIOD, policy == ZeroLossPolicy::Clamp);
    let mom10 = momentum(&closes, MOMENTUM_PERIOD);
    let roc10 = rate_of_change(&closes, MOMENTUM_PERIOD);
    let macd_out = macd(&closes, 12, 26, 9);

    let columns: [&[f64]; N_FEATURES] = [
        &bands.middle_band,
        &ma50,
        &vol20,
        &rsi14.values,
        &bands.upper_band,
        &bands.lower_band,
        &mom10,
        &roc10,
        &macd_out.macd_line,
        &macd_out.signal_line,
    ];

    if policy == ZeroLossPolicy::Reject {
        // Only rows that would otherwise be kept count as a violation.
        let rsi_col = 3;
        let defined_elsewhere = |i: usize| {
            columns
                .iter()
                .enumerate()
                .all(|(c, col)| c == rsi_col || col[i].is_finite())
        };
        if let Some(&index) = rsi14.zero_loss.iter().find(|&&i| defined_elsewhere(i)) {
            return Err(ForecastError::UndefinedIndicator {
                indicator: "rsi_14",
                index,
            });
        }
    } else if !rsi14.zero_loss.is_empty() {
        debug!(
            "RSI average loss was zero on {} rows ({:?} policy)",
            rsi14.zero_loss.len(),
            policy
        );
    }

    let mut points = Vec::with_capacity(n.saturating_sub(WARMUP - 1));
    let mut features = Vec::with_capacity(points.capacity());
    let mut dropped_late = 0usize;

    for (i, point) in series.points().iter().enumerate() {
        let mut row = [0.0; N_FEATURES];
        for (slot, col) in row.iter_mut().zip(columns.iter()) {
            *slot = col[i];
        }
        if row.iter().all(|v| v.is_finite()) {
            points.push(*point);
            features.push(row);
        } else if i >= WARMUP - 1 {
            dropped_late += 1;
        }
    }

    if dropped_late > 0 {
        warn!("Dropped {} rows with undefined indicators after warm-up", dropped_late);
    }

    Ok(EnrichedSeries { points, features })
}
