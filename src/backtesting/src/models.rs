use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How per-period returns are accumulated into a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compounding {
    /// Running sum of returns; the curve starts at 0.
    #[default]
    Additive,
    /// Running product of `1 + r`; the curve starts at 1.
    Multiplicative,
}

impl Compounding {
    /// Total return expressed by the last point of `curve`, as a fraction.
    pub fn final_return(self, curve: &[f64]) -> f64 {
        match (self, curve.last()) {
            (_, None) => 0.0,
            (Compounding::Additive, Some(&last)) => last,
            (Compounding::Multiplicative, Some(&last)) => last - 1.0,
        }
    }

    /// `final_return` in percent.
    pub fn final_return_pct(self, curve: &[f64]) -> f64 {
        100.0 * self.final_return(curve)
    }
}

impl std::fmt::Display for Compounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compounding::Additive => write!(f, "additive"),
            Compounding::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

impl std::str::FromStr for Compounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "additive" | "sum" => Ok(Compounding::Additive),
            "multiplicative" | "compound" | "product" => Ok(Compounding::Multiplicative),
            other => Err(format!("unknown compounding mode: {other}")),
        }
    }
}

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("length mismatch: {predictions} predictions vs {returns} returns")]
    LengthMismatch { predictions: usize, returns: usize },

    #[error("prediction at index {index} is {value}, expected 0 or 1")]
    InvalidSignal { index: usize, value: u8 },
}

/// Full output of a long-only backtest over one test window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Accumulation mode used for both curves.
    pub compounding: Compounding,
    /// Position held during each period (prediction shifted one period).
    pub positions: Vec<u8>,
    /// Strategy return booked at each period.
    pub strategy_returns: Vec<f64>,
    /// Buy-and-hold return booked at each period.
    pub market_returns: Vec<f64>,
    /// Cumulative strategy curve.
    pub strategy_curve: Vec<f64>,
    /// Cumulative buy-and-hold curve.
    pub market_curve: Vec<f64>,
    /// Performance metrics of the strategy returns.
    pub metrics: FxHashMap<String, f64>,
    /// Performance metrics of the buy-and-hold returns.
    pub market_metrics: FxHashMap<String, f64>,
}

impl BacktestResult {
    pub fn final_strategy_pct(&self) -> f64 {
        self.compounding.final_return_pct(&self.strategy_curve)
    }

    pub fn final_market_pct(&self) -> f64 {
        self.compounding.final_return_pct(&self.market_curve)
    }

    /// Number of periods in the test window.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_return() {
        assert_eq!(Compounding::Additive.final_return(&[0.0, 0.05]), 0.05);
        assert!((Compounding::Multiplicative.final_return(&[1.0, 1.05]) - 0.05).abs() < 1e-12);
        assert_eq!(Compounding::Multiplicative.final_return(&[]), 0.0);
        assert!((Compounding::Additive.final_return_pct(&[0.0, -0.01]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_compounding_parse_and_serde() {
        assert_eq!("Additive".parse::<Compounding>(), Ok(Compounding::Additive));
        assert_eq!("compound".parse::<Compounding>(), Ok(Compounding::Multiplicative));
        assert!("geometric".parse::<Compounding>().is_err());

        let json = serde_json::to_string(&Compounding::Multiplicative).unwrap();
        assert_eq!(json, "\"multiplicative\"");
    }
}
