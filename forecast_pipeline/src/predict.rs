use chrono::NaiveDate;
use copper_forecast::ForecastError;
use copper_forecast::models::Classifier;
use serde::Serialize;
use std::fmt;

use crate::dataset::StandardScaler;
use crate::features::EnrichedSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Forecast for the most recent session in the data.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub timestamp: NaiveDate,
    pub close: f64,
    pub direction: Direction,
    /// Probability the classifier assigns to `direction`, in [0.5, 1].
    pub confidence: f64,
}

/// Classify the last enriched row with a persisted model and scaler.
pub fn latest_prediction<C: Classifier>(
    model: &C,
    scaler: Option<&StandardScaler>,
    enriched: &EnrichedSeries,
) -> Result<Prediction, ForecastError> {
    let (point, features) = enriched
        .last()
        .ok_or_else(|| ForecastError::insufficient("latest prediction", 1, 0))?;

    let row = match scaler {
        Some(scaler) => scaler.transform_row(features)?,
        None => features.to_vec(),
    };

    let p_up = model.predict_proba_row(&row);
    let (direction, confidence) = if p_up > 0.5 {
        (Direction::Up, p_up)
    } else {
        (Direction::Down, 1.0 - p_up)
    };

    Ok(Prediction {
        timestamp: point.timestamp,
        close: point.close,
        direction,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::compute_indicators_default;
    use copper_forecast::{OhlcSeries, PricePoint};

    /// Always answers with a fixed probability, after checking row width.
    struct Fixed(f64);

    impl Classifier for Fixed {
        fn fit(&mut self, _x: &[Vec<f64>], _y: &[u8]) -> Result<(), ForecastError> {
            Ok(())
        }

        fn predict_proba_row(&self, row: &[f64]) -> f64 {
            assert_eq!(row.len(), 10);
            self.0
        }
    }

    fn enriched() -> EnrichedSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let points = (0..60)
            .map(|i| {
                let c = 4.0 + 0.1 * (i as f64 * 0.5).cos();
                PricePoint {
                    timestamp: start + chrono::Days::new(i),
                    open: c,
                    high: c,
                    low: c,
                    close: c,
                    volume: 1.0,
                }
            })
            .collect();
        compute_indicators_default(&OhlcSeries::new(points).unwrap()).unwrap()
    }

    #[test]
    fn test_latest_prediction() {
        let series = enriched();
        let up = latest_prediction(&Fixed(0.8), None, &series).unwrap();
        assert_eq!(up.direction, Direction::Up);
        assert!((up.confidence - 0.8).abs() < 1e-12);
        assert_eq!(up.timestamp, series.points().last().unwrap().timestamp);

        let down = latest_prediction(&Fixed(0.3), None, &series).unwrap();
        assert_eq!(down.direction, Direction::Down);
        assert!((down.confidence - 0.7).abs() < 1e-12);

        // exactly one half is not a call for "up"
        assert_eq!(latest_prediction(&Fixed(0.5), None, &series).unwrap().direction, Direction::Down);
    }

    #[test]
    fn test_latest_prediction_checks_scaler_width() {
        let series = enriched();
        let scaler = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert!(latest_prediction(&Fixed(0.9), Some(&scaler), &series).is_err());
    }
}
