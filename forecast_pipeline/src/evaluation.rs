use anyhow::{Context, Result};
use backtesting::Compounding;
use copper_forecast::ForecastError;
use copper_forecast::core::io::write_file;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Persistence forecast: tomorrow's label is today's.
///
/// `pred[0]` has no predecessor and repeats `y_true[0]`.
pub fn naive_baseline(y_true: &[u8]) -> Vec<u8> {
    match y_true.first() {
        None => Vec::new(),
        Some(&first) => std::iter::once(first)
            .chain(y_true[..y_true.len() - 1].iter().copied())
            .collect(),
    }
}

/// Fraction of positions where prediction and truth agree.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> Result<f64, ForecastError> {
    if y_true.len() != y_pred.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "accuracy over {} labels and {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(ForecastError::InvalidParameter("accuracy of an empty label set".into()));
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(hits as f64 / y_true.len() as f64)
}

/// Binary confusion counts, rows = truth, columns = prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut cm = ConfusionMatrix::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (0, 0) => cm.true_negative += 1,
                (0, _) => cm.false_positive += 1,
                (_, 0) => cm.false_negative += 1,
                _ => cm.true_positive += 1,
            }
        }
        cm
    }

    /// Precision, recall and F1 for class 0 (`Down`) and class 1 (`Up`).
    pub fn class_metrics(&self) -> [ClassMetrics; 2] {
        let down = ClassMetrics::new(
            self.true_negative,
            self.false_negative,
            self.false_positive,
        );
        let up = ClassMetrics::new(
            self.true_positive,
            self.false_positive,
            self.false_negative,
        );
        [down, up]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true samples of this class.
    pub support: usize,
}

impl ClassMetrics {
    // Undefined ratios (0/0) read as 0, as in the usual classification report.
    fn new(hits: usize, false_alarms: usize, misses: usize) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(hits, hits + false_alarms);
        let recall = ratio(hits, hits + misses);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: hits + misses,
        }
    }
}

/// Headline numbers of one test-window evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub n_test: usize,
    pub model_accuracy: f64,
    pub naive_accuracy: f64,
    pub compounding: Compounding,
    pub strategy_performance_pct: f64,
    pub market_performance_pct: f64,
    pub confusion: ConfusionMatrix,
    pub down: ClassMetrics,
    pub up: ClassMetrics,
}

/// Combine classification quality and backtest outcome.
///
/// Performance is read from the last point of each curve: `(last - 1) * 100`
/// for a multiplicative curve, `last * 100` for an additive one.
pub fn summarize(
    y_true: &[u8],
    y_pred: &[u8],
    y_naive: &[u8],
    strategy_curve: &[f64],
    market_curve: &[f64],
    compounding: Compounding,
) -> Result<Report, ForecastError> {
    let model_accuracy = accuracy(y_true, y_pred)?;
    let naive_accuracy = accuracy(y_true, y_naive)?;

    let confusion = ConfusionMatrix::from_labels(y_true, y_pred);
    let [down, up] = confusion.class_metrics();

    Ok(Report {
        n_test: y_true.len(),
        model_accuracy,
        naive_accuracy,
        compounding,
        strategy_performance_pct: compounding.final_return_pct(strategy_curve),
        market_performance_pct: compounding.final_return_pct(market_curve),
        confusion,
        down,
        up,
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test rows: {}", self.n_test)?;
        writeln!(f, "Model accuracy: {:.4}", self.model_accuracy)?;
        writeln!(f, "Naive accuracy: {:.4}", self.naive_accuracy)?;
        writeln!(f)?;
        writeln!(f, "{:>8} {:>10} {:>10} {:>10} {:>8}", "", "precision", "recall", "f1", "support")?;
        for (name, m) in [("down", &self.down), ("up", &self.up)] {
            writeln!(
                f,
                "{:>8} {:>10.2} {:>10.2} {:>10.2} {:>8}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = actual, cols = predicted):")?;
        writeln!(f, "  [{:>5} {:>5}]", self.confusion.true_negative, self.confusion.false_positive)?;
        writeln!(f, "  [{:>5} {:>5}]", self.confusion.false_negative, self.confusion.true_positive)?;
        writeln!(f)?;
        writeln!(f, "Compounding: {}", self.compounding)?;
        writeln!(f, "Strategy Performance: {:.2}%", self.strategy_performance_pct)?;
        write!(f, "Market Performance: {:.2}%", self.market_performance_pct)
    }
}

/// Write the report as plain text.
pub fn write_report<P: AsRef<Path>>(path: P, report: &Report) -> Result<()> {
    let path = path.as_ref();
    let text = format!("Copper Direction Forecast Report\n================================\n\n{report}\n");
    write_file(path, text)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_naive_baseline() {
        assert_eq!(naive_baseline(&[1, 0, 0, 1]), vec![1, 1, 0, 0]);
        assert_eq!(naive_baseline(&[0]), vec![0]);
        assert!(naive_baseline(&[]).is_empty());
    }

    #[test]
    fn test_accuracy() {
        assert!((accuracy(&[1, 0, 1, 1], &[1, 1, 1, 0]).unwrap() - 0.5).abs() < 1e-12);
        assert!(accuracy(&[1, 0], &[1]).is_err());
        assert!(accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_confusion_and_class_metrics() {
        let y_true = [1, 1, 1, 0, 0, 0, 1, 0];
        let y_pred = [1, 1, 0, 0, 1, 0, 1, 0];
        let cm = ConfusionMatrix::from_labels(&y_true, &y_pred);
        assert_eq!(
            cm,
            ConfusionMatrix {
                true_negative: 3,
                false_positive: 1,
                false_negative: 1,
                true_positive: 3,
            }
        );

        let [down, up] = cm.class_metrics();
        assert!((up.precision - 0.75).abs() < 1e-12);
        assert!((up.recall - 0.75).abs() < 1e-12);
        assert!((down.f1 - 0.75).abs() < 1e-12);
        assert_eq!(up.support, 4);
        assert_eq!(down.support, 4);
    }

    #[test]
    fn test_class_metrics_never_predicted() {
        let cm = ConfusionMatrix::from_labels(&[1, 0, 1], &[0, 0, 0]);
        let [down, up] = cm.class_metrics();
        assert_eq!(up.precision, 0.0);
        assert_eq!(up.f1, 0.0);
        assert!((down.recall - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarize() {
        let y_true = [1, 0, 1, 1];
        let y_pred = [1, 0, 0, 1];
        let naive = naive_baseline(&y_true);

        let report = summarize(
            &y_true,
            &y_pred,
            &naive,
            &[1.0, 1.02, 1.05],
            &[1.0, 0.99, 0.97],
            Compounding::Multiplicative,
        )
        .unwrap();
        assert!((report.model_accuracy - 0.75).abs() < 1e-12);
        assert!((report.naive_accuracy - 0.5).abs() < 1e-12);
        assert!((report.strategy_performance_pct - 5.0).abs() < 1e-9);
        assert!((report.market_performance_pct + 3.0).abs() < 1e-9);

        let additive = summarize(&y_true, &y_pred, &naive, &[0.0, 0.01, -0.01], &[0.0], Compounding::Additive).unwrap();
        assert!((additive.strategy_performance_pct + 1.0).abs() < 1e-9);
        assert_eq!(additive.market_performance_pct, 0.0);

        assert!(summarize(&y_true, &y_pred[..3], &naive, &[], &[], Compounding::Additive).is_err());
    }

    #[test]
    fn test_write_report() {
        let report = summarize(&[1, 0], &[1, 1], &[1, 1], &[0.0, 0.02], &[0.0, 0.01], Compounding::Additive).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/report.txt");
        write_report(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Model accuracy: 0.5000"));
        assert!(text.contains("Strategy Performance: 2.00%"));
        assert!(text.contains("Market Performance: 1.00%"));
    }
}
