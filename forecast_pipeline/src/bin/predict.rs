use anyhow::Result;
use forecast_pipeline::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;

    let (saved, scaler) = load_artifacts(&config.artifacts)?;
    let enriched = load_enriched(&config)?;

    let prediction = latest_prediction(&saved.model, scaler.as_ref(), &enriched)?;

    println!("{} latest model prediction", config.ticker);
    println!("  Date:       {}", prediction.timestamp);
    println!("  Close:      {:.4}", prediction.close);
    println!(
        "  Direction:  {} ({}-day horizon)",
        prediction.direction, saved.horizon
    );
    println!("  Confidence: {:.2}%", 100.0 * prediction.confidence);

    Ok(())
}
