use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::ForecastError;

/// One trading period of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    fn check(&self) -> Result<(), String> {
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} is not a finite number"));
            }
            if value < 0.0 {
                return Err(format!("{name} is negative ({value})"));
            }
        }
        // Returns are taken relative to the close.
        if self.close == 0.0 {
            return Err("close is zero".to_string());
        }
        Ok(())
    }
}

/// Ordered, immutable OHLCV history.
///
/// Timestamps are strictly ascending; gaps between sessions are allowed and
/// never filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OhlcSeries {
    points: Vec<PricePoint>,
}

impl OhlcSeries {
    /// Validate and wrap a sequence of price points.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ForecastError> {
        for (row, point) in points.iter().enumerate() {
            point
                .check()
                .map_err(|reason| ForecastError::InvalidData { row, reason })?;
        }

        if let Some(row) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(ForecastError::InvalidData {
                row: row + 1,
                reason: format!(
                    "timestamp {} does not follow {}",
                    points[row + 1].timestamp,
                    points[row].timestamp
                ),
            });
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Keep only rows dated within `[start, end]`; either bound may be open.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> OhlcSeries {
        let points = self
            .points
            .iter()
            .filter(|p| start.is_none_or(|s| p.timestamp >= s))
            .filter(|p| end.is_none_or(|e| p.timestamp <= e))
            .copied()
            .collect();
        OhlcSeries { points }
    }
}

const DATE_COLUMNS: &[&str] = &["date", "timestamp", "datetime", "time"];
const REQUIRED: &[&str] = &["open", "high", "low", "close", "volume"];

/// Load a headered OHLCV CSV file.
///
/// Header names are matched case-insensitively. Rows with an empty or `NaN`
/// field are skipped, the same way a `dropna` over the download would.
pub fn load_ohlcv<P: AsRef<Path>>(path: P) -> Result<OhlcSeries, ForecastError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let series = read_ohlcv(file)?;
    info!("Loaded {} price rows from {}", series.len(), path.display());
    Ok(series)
}

/// Parse OHLCV CSV content from any reader. See [`load_ohlcv`].
pub fn read_ohlcv<R: Read>(reader: R) -> Result<OhlcSeries, ForecastError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let date_idx = headers
        .iter()
        .position(|h| DATE_COLUMNS.contains(&h.as_str()))
        .ok_or_else(|| ForecastError::MissingColumn {
            column: "date".to_string(),
        })?;

    let mut value_idx = [0usize; 5];
    for (slot, name) in value_idx.iter_mut().zip(REQUIRED) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ForecastError::MissingColumn {
                column: (*name).to_string(),
            })?;
    }

    let mut points = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let date_field = record.get(date_idx).unwrap_or("");
        let fields: Vec<&str> = value_idx
            .iter()
            .map(|&i| record.get(i).unwrap_or(""))
            .collect();

        if date_field.is_empty() || fields.iter().any(|f| is_missing(f)) {
            skipped += 1;
            continue;
        }

        let timestamp = parse_date(date_field).ok_or_else(|| ForecastError::InvalidData {
            row,
            reason: format!("unrecognised date `{date_field}`"),
        })?;

        let mut values = [0.0f64; 5];
        for ((value, field), name) in values.iter_mut().zip(&fields).zip(REQUIRED) {
            *value = field.parse::<f64>().map_err(|_| ForecastError::InvalidData {
                row,
                reason: format!("{name} `{field}` is not a number"),
            })?;
        }

        points.push(PricePoint {
            timestamp,
            open: values[0],
            high: values[1],
            low: values[2],
            close: values[3],
            volume: values[4],
        });
    }

    if skipped > 0 {
        debug!("Skipped {} incomplete rows", skipped);
    }

    OhlcSeries::new(points)
}

fn is_missing(field: &str) -> bool {
    field.is_empty() || field.eq_ignore_ascii_case("nan") || field.eq_ignore_ascii_case("null")
}

/// Accepts `YYYY-MM-DD`, `YYYYMMDD`, and either followed by a time part.
fn parse_date(field: &str) -> Option<NaiveDate> {
    let date_part = field.split([' ', 'T']).next().unwrap_or(field);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y%m%d"))
        .ok()
}
