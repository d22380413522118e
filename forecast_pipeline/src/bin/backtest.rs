use anyhow::{Context, Result};
use backtesting::generate_text_report;
use copper_forecast::models::Classifier;
use forecast_pipeline::*;

/// Backtest the persisted model on the configured data without retraining.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Copper Direction Forecast - backtest from saved model\n");

    let config = Config::load()?;

    // Load model and scaler
    println!("Loading model from {}...", config.artifacts.model.display());
    let (saved, scaler) = load_artifacts(&config.artifacts)?;

    if saved.horizon != config.horizon {
        anyhow::bail!(
            "model was trained for horizon {}, configuration asks for {}",
            saved.horizon,
            config.horizon
        );
    }

    // Rebuild the same split, unscaled, and apply the persisted scaler
    let enriched = load_enriched(&config)?;
    let params = DatasetParams {
        scale: false,
        ..config.dataset_params()
    };
    let data = prepare(&enriched, &params)?;
    let x_test = match &scaler {
        Some(scaler) => scaler.transform(&data.x_test)?,
        None => data.x_test.clone(),
    };
    println!("Test rows: {}", data.n_test());

    let y_pred = saved.model.predict(&x_test);
    let y_naive = naive_baseline(&data.y_test);

    let result = backtest_predictions(&y_pred, &data, config.compounding)?;
    let report = summarize(
        &data.y_test,
        &y_pred,
        &y_naive,
        &result.strategy_curve,
        &result.market_curve,
        config.compounding,
    )?;

    // Write report
    let out = &config.output_dir;
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
    write_report(out.join("backtest_saved_model.txt"), &report)?;
    generate_text_report(&result, out.join("backtest_saved_model_metrics.txt"))?;
    write_curves_csv(
        out.join("curves_saved_model.csv"),
        &data.test_timestamps,
        &result.strategy_curve,
        &result.market_curve,
    )?;

    println!("\n{}", report);
    println!("\nBacktest completed successfully.");

    Ok(())
}
