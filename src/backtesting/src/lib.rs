pub mod core;
pub mod metrics;
pub mod models;
pub mod report;

pub use self::core::{buy_and_hold, cumulate, positions, run_backtest, simulate, strategy_returns};
pub use metrics::calculate_metrics;
pub use models::{BacktestError, BacktestResult, Compounding};
pub use report::{generate_json_report, generate_text_report};
