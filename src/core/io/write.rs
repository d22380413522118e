use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::ForecastError;

/// Writes contents to a file, creating parent directories if they don't exist.
///
/// # Arguments
///
/// * `path` - Path to the file to write.
/// * `contents` - Data to write to the file.
///
/// # Returns
///
/// `Ok(())` on success, or an `io::Error` on failure.
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(contents.as_ref())?;
    Ok(())
}

/// Replace `path` with whatever `fill` writes, or leave it untouched.
///
/// The content goes to a temporary file in the destination directory which is
/// renamed over `path` only once `fill` has succeeded and the data is synced.
pub fn write_atomic<P, F>(path: P, fill: F) -> Result<(), ForecastError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), ForecastError>,
{
    let staged = stage(path.as_ref(), fill)?;
    commit(staged, path)
}

/// Write `fill`'s output to a synced temporary file next to `path` without
/// touching `path` itself. Hand the result to [`commit`] to publish it;
/// dropping it discards the content.
pub fn stage<P, F>(path: P, fill: F) -> Result<NamedTempFile, ForecastError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), ForecastError>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        fill(&mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Rename a staged file over `path`.
pub fn commit<P: AsRef<Path>>(staged: NamedTempFile, path: P) -> Result<(), ForecastError> {
    staged
        .persist(path.as_ref())
        .map_err(|e| ForecastError::Io(e.error))?;
    Ok(())
}

/// Stage `value` as pretty JSON.
pub fn stage_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<NamedTempFile, ForecastError> {
    stage(path, |w| {
        serde_json::to_writer_pretty(&mut *w, value)?;
        Ok(())
    })
}

/// Serialize `value` as pretty JSON through [`write_atomic`].
pub fn write_json_atomic<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), ForecastError> {
    let staged = stage_json(path.as_ref(), value)?;
    commit(staged, path)
}
