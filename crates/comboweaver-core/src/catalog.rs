use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::model::{Part, SampleCombo};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate part id in {character} catalog: {part_id}")]
    DuplicatePart { character: String, part_id: String },
    #[error("part {part_id} belongs to {found}, not {expected}")]
    ForeignPart {
        part_id: String,
        expected: String,
        found: String,
    },
    #[error("invalid catalog json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(String),
}

impl From<anyhow::Error> for CatalogError {
    fn from(value: anyhow::Error) -> Self {
        Self::Io(format!("{value:#}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    character: String,
    parts: Vec<Part>,
    #[serde(default)]
    sample_combos: Vec<SampleCombo>,
}

/// Read-only part library for one character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterCatalog {
    character: String,
    parts: Vec<Arc<Part>>,
    sample_combos: Vec<SampleCombo>,
}

impl CharacterCatalog {
    /// Builds a catalog, ordering parts by their `order` field (ties keep input order).
    pub fn new(
        character: impl Into<String>,
        mut parts: Vec<Part>,
        sample_combos: Vec<SampleCombo>,
    ) -> Result<Self, CatalogError> {
        let character = character.into();
        let mut seen = HashSet::new();
        for part in &parts {
            if !seen.insert(part.id.as_str()) {
                return Err(CatalogError::DuplicatePart {
                    character,
                    part_id: part.id.clone(),
                });
            }
            if part.character != character {
                return Err(CatalogError::ForeignPart {
                    part_id: part.id.clone(),
                    expected: character,
                    found: part.character.clone(),
                });
            }
        }
        parts.sort_by_key(|part| part.order);

        Ok(Self {
            character,
            parts: parts.into_iter().map(Arc::new).collect(),
            sample_combos,
        })
    }

    #[must_use]
    pub fn empty(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            parts: Vec::new(),
            sample_combos: Vec::new(),
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_slice(bytes)?;
        Self::new(file.character, file.parts, file.sample_combos)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, CatalogError> {
        let file = CatalogFile {
            character: self.character.clone(),
            parts: self.parts.iter().map(|part| part.as_ref().clone()).collect(),
            sample_combos: self.sample_combos.clone(),
        };
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    #[must_use]
    pub fn character(&self) -> &str {
        &self.character
    }

    #[must_use]
    pub fn parts(&self) -> &[Arc<Part>] {
        &self.parts
    }

    #[must_use]
    pub fn sample_combos(&self) -> &[SampleCombo] {
        &self.sample_combos
    }

    #[must_use]
    pub fn sample(&self, name: &str) -> Option<&SampleCombo> {
        self.sample_combos.iter().find(|sample| sample.name == name)
    }

    #[must_use]
    pub fn find(&self, part_id: &str) -> Option<Arc<Part>> {
        self.parts.iter().find(|part| part.id == part_id).cloned()
    }

    /// Looks up parts in the given order, skipping ids this catalog does not know.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, part_ids: &[S]) -> Vec<Arc<Part>> {
        let resolved: Vec<Arc<Part>> = part_ids
            .iter()
            .filter_map(|part_id| self.find(part_id.as_ref()))
            .collect();
        if resolved.len() != part_ids.len() {
            debug!(
                requested = part_ids.len(),
                resolved = resolved.len(),
                "unknown part ids dropped"
            );
        }
        resolved
    }
}

#[instrument(fields(path = %path.display()))]
pub fn load_catalog(path: &Path) -> Result<CharacterCatalog, CatalogError> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read catalog: {}", path.display()))?;
    let catalog = CharacterCatalog::from_json(&bytes)?;
    info!(
        character = catalog.character(),
        parts = catalog.parts().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub character: String,
}

/// Lists every readable catalog under `directory`, sorted by path. A missing
/// directory is created and reported as empty.
#[instrument(fields(directory = %directory.display()))]
pub fn scan_catalog_dir(directory: &Path) -> anyhow::Result<Vec<CatalogEntry>> {
    if !directory.exists() {
        fs::create_dir_all(directory).with_context(|| {
            format!("failed to create catalog directory: {}", directory.display())
        })?;
        warn!("catalog directory missing, created empty directory");
        return Ok(Vec::new());
    }
    if !directory.is_dir() {
        return Err(anyhow::anyhow!(
            "catalog path is not a directory: {}",
            directory.display()
        ));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(directory).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(?error, "ignoring unreadable entry while scanning catalogs");
                continue;
            }
        };
        let is_json = entry
            .path()
            .extension()
            .and_then(|value| value.to_str())
            .is_some_and(|value| value.eq_ignore_ascii_case("json"));
        if !entry.file_type().is_file() || !is_json {
            continue;
        }

        match load_catalog(entry.path()) {
            Ok(catalog) => entries.push(CatalogEntry {
                path: entry.path().to_path_buf(),
                character: catalog.character().to_string(),
            }),
            Err(error) => warn!(%error, path = %entry.path().display(), "skipping invalid catalog"),
        }
    }

    entries.sort_by(|left, right| left.path.cmp(&right.path));
    debug!(count = entries.len(), "catalog scan complete");
    Ok(entries)
}

/// Finds and loads the catalog for `character` under `directory`.
pub fn load_character(directory: &Path, character: &str) -> anyhow::Result<CharacterCatalog> {
    let entry = scan_catalog_dir(directory)?
        .into_iter()
        .find(|entry| entry.character == character)
        .ok_or_else(|| anyhow::anyhow!("no catalog for character {character}"))?;
    load_catalog(&entry.path).map_err(anyhow::Error::from)
}
