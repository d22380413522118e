use chrono::NaiveDate;
use copper_forecast::ForecastError;
use copper_forecast::core::io::{forward_returns, split_index};
use log::info;
use serde::{Deserialize, Serialize};
use stats::{Ddof, column_mean_std};

use crate::features::{EnrichedSeries, FEATURE_NAMES};

/// Direction labels: 1 when the close `horizon` rows ahead is strictly higher.
///
/// The last `horizon` rows have no future close and get no label.
pub fn make_labels(closes: &[f64], horizon: usize) -> Vec<u8> {
    (0..closes.len().saturating_sub(horizon))
        .map(|i| u8::from(closes[i + horizon] > closes[i]))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetParams {
    pub horizon: usize,
    pub test_fraction: f64,
    pub scale: bool,
}

impl Default for DatasetParams {
    fn default() -> Self {
        Self {
            horizon: 5,
            test_fraction: 0.2,
            scale: true,
        }
    }
}

/// Per-feature standardisation fitted on training rows only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    /// Population standard deviation, or 1 where a feature is constant.
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ForecastError> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || width == 0 {
            return Err(ForecastError::insufficient("scaler fit", 1, rows.len()));
        }

        let (mean, scale) = (0..width)
            .map(|col| {
                let (m, sd) = column_mean_std(rows, col, Ddof::Population);
                (m, if sd > 0.0 { sd } else { 1.0 })
            })
            .unzip();

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        if row.len() != self.n_features() {
            return Err(ForecastError::InvalidParameter(format!(
                "scaler was fit on {} features, row has {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ForecastError> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

/// Model-ready train/test matrices plus what the backtest needs about the
/// test window.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub feature_names: Vec<String>,
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<u8>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<u8>,
    /// Present when scaling was requested.
    pub scaler: Option<StandardScaler>,
    pub train_timestamps: Vec<NaiveDate>,
    pub test_timestamps: Vec<NaiveDate>,
    pub test_closes: Vec<f64>,
    /// Return from each test row's close to the next row's close.
    pub test_returns: Vec<f64>,
}

impl PreparedData {
    pub fn n_train(&self) -> usize {
        self.y_train.len()
    }

    pub fn n_test(&self) -> usize {
        self.y_test.len()
    }
}

/// Label, split and (optionally) scale an enriched series.
///
/// Rows are never shuffled: the first `floor(N * (1 - test_fraction))`
/// labeled rows train, the remainder test.
pub fn prepare(series: &EnrichedSeries, params: &DatasetParams) -> Result<PreparedData, ForecastError> {
    if params.horizon == 0 {
        return Err(ForecastError::InvalidParameter("horizon must be at least 1".into()));
    }
    if !(params.test_fraction > 0.0 && params.test_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "test_fraction must lie strictly between 0 and 1, got {}",
            params.test_fraction
        )));
    }

    let closes = series.closes();
    let labels = make_labels(&closes, params.horizon);
    let n = labels.len();
    if n == 0 {
        return Err(ForecastError::insufficient(
            "labels",
            params.horizon.saturating_add(1),
            series.len(),
        ));
    }

    let split = split_index(n, params.test_fraction)?;
    let timestamps = series.timestamps();

    let raw_train = series.feature_matrix(0..split);
    let raw_test = series.feature_matrix(split..n);

    let (x_train, x_test, scaler) = if params.scale {
        let scaler = StandardScaler::fit(&raw_train)?;
        let train = scaler.transform(&raw_train)?;
        let test = scaler.transform(&raw_test)?;
        (train, test, Some(scaler))
    } else {
        (raw_train, raw_test, None)
    };

    // Row n exists because horizon >= 1, so every test row has a next close.
    let test_returns = forward_returns(&closes, split, n)?;

    info!(
        "Prepared {} train / {} test rows (horizon {}, scaled: {})",
        split,
        n - split,
        params.horizon,
        params.scale
    );

    Ok(PreparedData {
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        x_train,
        y_train: labels[..split].to_vec(),
        x_test,
        y_test: labels[split..].to_vec(),
        scaler,
        train_timestamps: timestamps[..split].to_vec(),
        test_timestamps: timestamps[split..n].to_vec(),
        test_closes: closes[split..n].to_vec(),
        test_returns,
    })
}
