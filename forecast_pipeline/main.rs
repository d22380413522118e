use anyhow::{Context, Result};
use backtesting::{generate_json_report, generate_text_report};
use copper_forecast::models::Classifier;
use forecast_pipeline::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Copper Direction Forecast - train and backtest\n");

    // Load configuration
    let config = Config::load()?;

    // Load market data and derive indicators
    let enriched = load_enriched(&config)?;

    // Label, split and scale
    let data = prepare(&enriched, &config.dataset_params())?;
    println!("Training rows: {}", data.n_train());
    println!("Test rows: {}", data.n_test());

    // Train
    let training = train_forest(config.forest_config(), &data)?;

    // Evaluate on the held-out suffix
    let y_pred = training.model.predict(&data.x_test);
    let y_naive = naive_baseline(&data.y_test);

    // Save model and scaler
    let saved = SavedModel {
        model: training.model,
        feature_names: data.feature_names.clone(),
        horizon: config.horizon,
    };
    save_artifacts(&config.artifacts, &saved, data.scaler.as_ref())?;

    println!("\nFeature importances:");
    for (name, importance) in saved.model.importance_ranking(&saved.feature_names) {
        println!("  {:<16} {:.4}", name, importance);
    }

    // Backtest
    let result = backtest_predictions(&y_pred, &data, config.compounding)?;
    let report = summarize(
        &data.y_test,
        &y_pred,
        &y_naive,
        &result.strategy_curve,
        &result.market_curve,
        config.compounding,
    )?;

    // Write results
    let out = &config.output_dir;
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
    write_report(out.join("report.txt"), &report)?;
    generate_text_report(&result, out.join("backtest_report.txt"))?;
    generate_json_report(&result, out.join("backtest_report.json"))?;
    write_curves_csv(
        out.join("curves.csv"),
        &data.test_timestamps,
        &result.strategy_curve,
        &result.market_curve,
    )?;

    // Print summary
    println!("\n{}\n", report);
    println!("In-sample accuracy: {:.4}", training.train_accuracy);

    let prediction = latest_prediction(&saved.model, data.scaler.as_ref(), &enriched)?;
    println!(
        "Latest ({} close {:.4}): {} with {:.2}% confidence",
        prediction.timestamp,
        prediction.close,
        prediction.direction,
        100.0 * prediction.confidence
    );
    println!("\nResults written to {}", out.display());

    Ok(())
}
