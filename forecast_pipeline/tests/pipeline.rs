use backtesting::{Compounding, simulate};
use copper_forecast::ForecastError;
use copper_forecast::models::Classifier;
use forecast_pipeline::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir, tempdir};

/// Deterministic pseudo-market: trend plus two cycles, about two trading years.
fn write_market_csv(rows: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Adj Close,Volume").unwrap();
    let start = chrono::NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    for i in 0..rows {
        let t = i as f64;
        let close = 3.0 + 0.002 * t + 0.25 * (t / 9.0).sin() + 0.1 * (t / 3.1).cos();
        let date = start + chrono::Days::new(i as u64);
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4},{:.4},{:.4},{}",
            date.format("%Y-%m-%d"),
            close * 0.998,
            close * 1.01,
            close * 0.99,
            close,
            close,
            1000 + i
        )
        .unwrap();
    }
    file
}

fn config_for(csv: &NamedTempFile, dir: &TempDir) -> Config {
    let mut config: Config = toml::from_str("data_file = \"unused.csv\"\nn_trees = 15").unwrap();
    config.data_file = csv.path().to_path_buf();
    config.artifacts = ArtifactPaths {
        model: dir.path().join("models/rf.json"),
        scaler: dir.path().join("models/scaler.json"),
    };
    config.output_dir = dir.path().join("results");
    config
}

#[test]
fn label_scenario() {
    assert_eq!(make_labels(&[10.0, 11.0, 9.0, 12.0, 13.0], 1), vec![1, 0, 1, 1]);
}

#[test]
fn backtest_scenario() {
    let curve = simulate(&[1, 1, 0, 1], &[0.01, -0.02, 0.03, 0.01], Compounding::Additive).unwrap();
    let expected = [0.0, 0.01, -0.01, -0.01];
    assert_eq!(curve.len(), expected.len());
    for (got, want) in curve.iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "{curve:?}");
    }
}

#[test]
fn train_save_reload_and_backtest() {
    let csv = write_market_csv(500);
    let dir = tempdir().unwrap();
    let config = config_for(&csv, &dir);

    let enriched = load_enriched(&config).unwrap();
    assert_eq!(enriched.len(), 500 - 49);

    let data = prepare(&enriched, &config.dataset_params()).unwrap();
    let training = train_forest(config.forest_config(), &data).unwrap();
    let y_pred = training.model.predict(&data.x_test);
    assert_eq!(y_pred.len(), data.n_test());

    let saved = SavedModel {
        model: training.model,
        feature_names: data.feature_names.clone(),
        horizon: config.horizon,
    };
    save_artifacts(&config.artifacts, &saved, data.scaler.as_ref()).unwrap();

    // A reloaded model applied through the reloaded scaler predicts the same.
    let (reloaded, scaler) = load_artifacts(&config.artifacts).unwrap();
    let scaler = scaler.unwrap();
    let raw = prepare(
        &enriched,
        &DatasetParams {
            scale: false,
            ..config.dataset_params()
        },
    )
    .unwrap();
    let x_test = scaler.transform(&raw.x_test).unwrap();
    assert_eq!(reloaded.model.predict(&x_test), y_pred);

    let result = backtest_predictions(&y_pred, &data, Compounding::Multiplicative).unwrap();
    assert_eq!(result.strategy_curve.len(), data.n_test());
    assert_eq!(result.positions[0], 0);

    let report = summarize(
        &data.y_test,
        &y_pred,
        &naive_baseline(&data.y_test),
        &result.strategy_curve,
        &result.market_curve,
        Compounding::Multiplicative,
    )
    .unwrap();
    assert!((0.0..=1.0).contains(&report.model_accuracy));
    assert_eq!(report.confusion.true_negative
        + report.confusion.false_positive
        + report.confusion.false_negative
        + report.confusion.true_positive, data.n_test());

    let expected_market = (data.test_closes.last().unwrap() / data.test_closes[0] - 1.0) * 100.0;
    assert!((report.market_performance_pct - expected_market).abs() < 1e-6);

    write_report(config.output_dir.join("report.txt"), &report).unwrap();
    write_curves_csv(
        config.output_dir.join("curves.csv"),
        &data.test_timestamps,
        &result.strategy_curve,
        &result.market_curve,
    )
    .unwrap();
    assert!(config.output_dir.join("curves.csv").exists());

    let latest = latest_prediction(&reloaded.model, Some(&scaler), &enriched).unwrap();
    assert_eq!(latest.timestamp, enriched.points().last().unwrap().timestamp);
    assert!(latest.confidence >= 0.5 && latest.confidence <= 1.0);
}

#[test]
fn training_is_reproducible() {
    let csv = write_market_csv(300);
    let dir = tempdir().unwrap();
    let config = config_for(&csv, &dir);

    let enriched = load_enriched(&config).unwrap();
    let data = prepare(&enriched, &config.dataset_params()).unwrap();
    let a = train_forest(config.forest_config(), &data).unwrap();
    let b = train_forest(config.forest_config(), &data).unwrap();
    assert_eq!(a.model.predict_proba(&data.x_test), b.model.predict_proba(&data.x_test));
}

#[test]
fn missing_artifacts_are_reported() {
    let dir = tempdir().unwrap();
    let paths = ArtifactPaths {
        model: dir.path().join("nope.json"),
        scaler: dir.path().join("nope_scaler.json"),
    };
    let err = load_model(&paths).unwrap_err();
    assert!(matches!(err, ForecastError::ArtifactNotFound { .. }));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn short_history_is_insufficient() {
    let csv = write_market_csv(40);
    let dir = tempdir().unwrap();
    let config = config_for(&csv, &dir);

    let err = load_enriched(&config).unwrap_err();
    let cause = err.downcast_ref::<ForecastError>().unwrap();
    assert!(matches!(cause, ForecastError::InsufficientData { needed: 50, got: 40, .. }));
}

#[test]
fn zero_close_is_rejected_at_load() {
    let csv = write_market_csv(200);
    let text = std::fs::read_to_string(csv.path()).unwrap();
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    // Row 190 of the data (line 191 after the header) gets a zero close.
    let mut fields: Vec<String> = lines[191].split(',').map(str::to_string).collect();
    fields[4] = "0".to_string();
    lines[191] = fields.join(",");
    std::fs::write(csv.path(), lines.join("\n")).unwrap();

    let dir = tempdir().unwrap();
    let config = config_for(&csv, &dir);
    let err = load_enriched(&config).unwrap_err();
    let cause = err.downcast_ref::<ForecastError>().unwrap();
    assert!(matches!(cause, ForecastError::InvalidData { row: 190, .. }));
}
