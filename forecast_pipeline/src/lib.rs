pub mod config;
pub mod data;
pub mod features;
pub mod dataset;
pub mod training;
pub mod evaluation;
pub mod model_io;
pub mod backtest;
pub mod predict;

pub use config::{Args, Config};
pub use data::{load_enriched, load_series};
pub use features::{EnrichedSeries, FEATURE_NAMES, ZeroLossPolicy, compute_indicators, compute_indicators_default};
pub use dataset::{DatasetParams, PreparedData, StandardScaler, make_labels, prepare};
pub use training::{TrainingResult, train_forest};
pub use evaluation::{Report, accuracy, naive_baseline, summarize, write_report};
pub use model_io::{ArtifactPaths, SavedModel, load_artifacts, load_model, load_scaler, save_artifacts};
pub use backtest::{backtest_predictions, write_curves_csv};
pub use predict::{Direction, Prediction, latest_prediction};
