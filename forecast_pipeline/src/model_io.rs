use chrono::{DateTime, Utc};
use copper_forecast::ForecastError;
use copper_forecast::core::io::{commit, stage_json};
use copper_forecast::models::RandomForest;
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::dataset::StandardScaler;

/// Where the fitted classifier and scaler live on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from("models/random_forest_model.json"),
            scaler: PathBuf::from("models/scaler.json"),
        }
    }
}

/// Container for a saved model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedModel {
    /// Fitted classifier
    pub model: RandomForest,
    /// Names of the feature columns, in training order
    pub feature_names: Vec<String>,
    /// Label horizon the model was trained for
    pub horizon: usize,
}

/// On-disk envelope. Both files of one training run carry the same stamp.
#[derive(Serialize, Deserialize)]
struct Stamped<T> {
    saved_at: DateTime<Utc>,
    artifact: T,
}

/// Persist the model and scaler.
///
/// Both files are fully written to temporaries before either is renamed into
/// place, the scaler first. An unscaled run stores `null` as its scaler so
/// both artifacts always exist after training.
pub fn save_artifacts(
    paths: &ArtifactPaths,
    model: &SavedModel,
    scaler: Option<&StandardScaler>,
) -> Result<(), ForecastError> {
    let saved_at = Utc::now();
    let model_file = stage_json(
        &paths.model,
        &Stamped {
            saved_at,
            artifact: model,
        },
    )?;
    let scaler_file = stage_json(
        &paths.scaler,
        &Stamped {
            saved_at,
            artifact: scaler,
        },
    )?;

    // Scaler first: if its rename fails the old pair is untouched. A failed
    // model rename leaves mismatched stamps, which `load_artifacts` rejects.
    commit(scaler_file, &paths.scaler)?;
    commit(model_file, &paths.model)?;

    info!(
        "Saved model to {} and scaler to {}",
        paths.model.display(),
        paths.scaler.display()
    );
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<Stamped<T>, ForecastError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ForecastError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Load a previously saved model. Never falls back to training.
pub fn load_model(paths: &ArtifactPaths) -> Result<SavedModel, ForecastError> {
    Ok(read_artifact(&paths.model)?.artifact)
}

/// Load the saved scaler; `None` when the model was trained unscaled.
pub fn load_scaler(paths: &ArtifactPaths) -> Result<Option<StandardScaler>, ForecastError> {
    Ok(read_artifact(&paths.scaler)?.artifact)
}

/// Load model and scaler, failing with `ArtifactMismatch` unless both were
/// written by the same `save_artifacts` call.
pub fn load_artifacts(
    paths: &ArtifactPaths,
) -> Result<(SavedModel, Option<StandardScaler>), ForecastError> {
    let model: Stamped<SavedModel> = read_artifact(&paths.model)?;
    let scaler: Stamped<Option<StandardScaler>> = read_artifact(&paths.scaler)?;
    if model.saved_at != scaler.saved_at {
        return Err(ForecastError::ArtifactMismatch {
            model: paths.model.clone(),
            scaler: paths.scaler.clone(),
        });
    }
    Ok((model.artifact, scaler.artifact))
}
