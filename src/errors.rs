use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a single forecast pipeline run.
///
/// None of these are retried. Persisted artifacts are only ever replaced by
/// a complete file, so an error never leaves a half-written model behind.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// History too short for the indicator windows, the label horizon or the
    /// train/test split.
    #[error("insufficient data for {stage}: need at least {needed} rows, got {got}")]
    InsufficientData {
        stage: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("missing column `{column}` in market data")]
    MissingColumn { column: String },

    /// A persisted scaler or classifier is absent; training has to run first.
    #[error("artifact not found: {} (run training first)", .path.display())]
    ArtifactNotFound { path: PathBuf },

    /// Model and scaler files come from different training runs.
    #[error(
        "artifacts do not belong together: {} and {} were saved by different runs",
        .model.display(),
        .scaler.display()
    )]
    ArtifactMismatch { model: PathBuf, scaler: PathBuf },

    #[error("{indicator} is undefined at row {index}: average loss is zero")]
    UndefinedIndicator {
        indicator: &'static str,
        index: usize,
    },

    #[error("invalid market data at row {row}: {reason}")]
    InvalidData { row: usize, reason: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    pub fn insufficient(stage: &'static str, needed: usize, got: usize) -> Self {
        ForecastError::InsufficientData { stage, needed, got }
    }
}
