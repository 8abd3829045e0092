use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

/// Writes `value` as pretty JSON through a temp file in the same directory,
/// so readers never observe a half-written file.
#[instrument(skip(value), fields(path = %path.display()))]
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(value).context("failed to serialize json")?;
    let mut temp_file = tempfile::NamedTempFile::new_in(
        path.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf),
    )
    .context("failed to create temp file")?;

    temp_file
        .write_all(&json)
        .context("failed to write temp file")?;
    temp_file
        .persist(path)
        .map_err(|error| anyhow::anyhow!(error.error))
        .with_context(|| format!("failed to persist file: {}", path.display()))?;

    debug!(bytes = json.len(), "json saved");
    Ok(())
}

#[instrument(fields(path = %path.display()))]
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
    let value = serde_json::from_slice(&content)
        .with_context(|| format!("invalid json in {}", path.display()))?;
    Ok(value)
}

/// Like [`load_json`], but a missing file yields `None` and an unparsable
/// one is moved aside to `<name>.corrupt` and also yields `None`.
#[instrument(fields(path = %path.display()))]
pub fn load_json_or_quarantine<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    match load_json(path) {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            let quarantine = quarantine_path(path);
            warn!(
                error = %format!("{error:#}"),
                quarantine = %quarantine.display(),
                "discarding unreadable file"
            );
            fs::rename(path, &quarantine).with_context(|| {
                format!("failed to move corrupt file aside: {}", path.display())
            })?;
            Ok(None)
        }
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}
