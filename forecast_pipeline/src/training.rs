use anyhow::{Context, Result};
use copper_forecast::models::{Classifier, ForestConfig, RandomForest};
use log::info;

use crate::dataset::PreparedData;
use crate::evaluation::accuracy;

/// Result of model training
pub struct TrainingResult {
    /// Fitted random forest
    pub model: RandomForest,
    /// In-sample accuracy on the training rows
    pub train_accuracy: f64,
}

/// Fit a random forest on the training part of `data`.
pub fn train_forest(config: ForestConfig, data: &PreparedData) -> Result<TrainingResult> {
    info!(
        "Training random forest: {} trees, max depth {}, seed {}",
        config.n_trees, config.max_depth, config.seed
    );

    let mut model = RandomForest::new(config);
    model
        .fit(&data.x_train, &data.y_train)
        .context("Failed to fit random forest")?;

    let train_accuracy = accuracy(&data.y_train, &model.predict(&data.x_train))?;
    info!("In-sample accuracy: {:.4}", train_accuracy);

    Ok(TrainingResult {
        model,
        train_accuracy,
    })
}
