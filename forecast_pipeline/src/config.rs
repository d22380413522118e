use anyhow::{Context, Result};
use backtesting::Compounding;
use chrono::NaiveDate;
use clap::Parser;
use copper_forecast::models::ForestConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dataset::DatasetParams;
use crate::features::ZeroLossPolicy;
use crate::model_io::ArtifactPaths;

/// Configuration for one forecast run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Daily OHLCV CSV for the contract
    pub data_file: PathBuf,

    /// Contract symbol, used in reports only
    #[serde(default = "default_ticker")]
    pub ticker: String,

    /// Ignore rows before this date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Ignore rows after this date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Rows ahead the direction label looks
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    /// Share of labeled rows held out for testing
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Standardise features with train-only statistics
    #[serde(default = "default_scale")]
    pub scale: bool,

    #[serde(default)]
    pub rsi_zero_loss: ZeroLossPolicy,

    #[serde(default)]
    pub compounding: Compounding,

    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub artifacts: ArtifactPaths,

    /// Directory for reports and curve dumps
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_ticker() -> String {
    "HG=F".to_string()
}

fn default_horizon() -> usize {
    5
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_scale() -> bool {
    true
}

fn default_n_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    6
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

fn default_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "forecast_pipeline")]
#[command(about = "Copper futures direction forecast with a long-only backtest")]
pub struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Market data file (CSV with date, open, high, low, close, volume)
    #[arg(value_name = "DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Label horizon in rows
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Test fraction (0-1)
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Disable feature standardisation
    #[arg(long)]
    pub no_scale: bool,

    /// RSI zero-loss policy: clamp, drop or reject
    #[arg(long)]
    pub rsi_zero_loss: Option<ZeroLossPolicy>,

    /// Curve accumulation: additive or multiplicative
    #[arg(long)]
    pub compounding: Option<Compounding>,

    /// Number of trees
    #[arg(long)]
    pub n_trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Model artifact path
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Scaler artifact path
    #[arg(long)]
    pub scaler: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let defaults = ArtifactPaths::default();
        let config = Config {
            data_file: args
                .data_file
                .clone()
                .ok_or_else(|| anyhow::anyhow!("DATA_FILE is required without --config"))?,
            ticker: default_ticker(),
            start_date: None,
            end_date: None,
            horizon: args.horizon.unwrap_or_else(default_horizon),
            test_fraction: args.test_fraction.unwrap_or_else(default_test_fraction),
            scale: !args.no_scale,
            rsi_zero_loss: args.rsi_zero_loss.unwrap_or_default(),
            compounding: args.compounding.unwrap_or_default(),
            n_trees: args.n_trees.unwrap_or_else(default_n_trees),
            max_depth: args.max_depth.unwrap_or_else(default_max_depth),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            seed: args.seed.unwrap_or_else(default_seed),
            artifacts: ArtifactPaths {
                model: args.model.clone().unwrap_or(defaults.model),
                scaler: args.scaler.clone().unwrap_or(defaults.scaler),
            },
            output_dir: args.output_dir.clone().unwrap_or_else(default_output_dir),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from either file or command-line arguments
    pub fn load() -> Result<Self> {
        let args = Args::parse();

        if let Some(config_path) = &args.config {
            Self::from_file(config_path)
        } else {
            Self::from_args(&args)
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            anyhow::bail!("horizon must be greater than 0");
        }

        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            anyhow::bail!("test_fraction must be in range (0, 1), got {}", self.test_fraction);
        }

        if self.n_trees == 0 {
            anyhow::bail!("n_trees must be greater than 0");
        }

        if self.max_depth == 0 {
            anyhow::bail!("max_depth must be greater than 0");
        }

        if self.min_samples_split < 2 {
            anyhow::bail!("min_samples_split must be at least 2");
        }

        if self.min_samples_leaf == 0 {
            anyhow::bail!("min_samples_leaf must be greater than 0");
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                anyhow::bail!("start_date {} is after end_date {}", start, end);
            }
        }

        Ok(())
    }

    pub fn dataset_params(&self) -> DatasetParams {
        DatasetParams {
            horizon: self.horizon,
            test_fraction: self.test_fraction,
            scale: self.scale,
        }
    }

    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            seed: self.seed,
            ..ForestConfig::default()
        }
    }
}
