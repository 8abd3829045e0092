use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::persistence;

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("favorite name must not be empty")]
    EmptyName,
    #[error("cannot save an empty sequence as a favorite")]
    EmptySequence,
    #[error("io error: {0}")]
    Io(String),
}

impl From<anyhow::Error> for FavoritesError {
    fn from(value: anyhow::Error) -> Self {
        Self::Io(format!("{value:#}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteCombo {
    pub id: Uuid,
    pub name: String,
    pub character: String,
    pub part_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Saved sequences, persisted as one JSON list.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
    favorites: Vec<FavoriteCombo>,
}

impl FavoritesStore {
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, FavoritesError> {
        let favorites: Vec<FavoriteCombo> =
            persistence::load_json_or_quarantine(path)?.unwrap_or_default();
        info!(count = favorites.len(), "favorites loaded");
        Ok(Self {
            path: path.to_path_buf(),
            favorites,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn all(&self) -> &[FavoriteCombo] {
        &self.favorites
    }

    pub fn for_character<'a>(
        &'a self,
        character: &'a str,
    ) -> impl Iterator<Item = &'a FavoriteCombo> + 'a {
        self.favorites
            .iter()
            .filter(move |favorite| favorite.character == character)
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&FavoriteCombo> {
        self.favorites.iter().find(|favorite| favorite.id == id)
    }

    #[instrument(skip(self, part_ids), fields(parts = part_ids.len()))]
    pub fn save(
        &mut self,
        name: &str,
        character: &str,
        part_ids: Vec<String>,
    ) -> Result<FavoriteCombo, FavoritesError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FavoritesError::EmptyName);
        }
        if part_ids.is_empty() {
            return Err(FavoritesError::EmptySequence);
        }

        let favorite = FavoriteCombo {
            id: Uuid::new_v4(),
            name: name.to_string(),
            character: character.to_string(),
            part_ids,
            created_at: Utc::now(),
        };
        self.favorites.push(favorite.clone());
        self.flush()?;
        info!(favorite_id = %favorite.id, "favorite saved");
        Ok(favorite)
    }

    /// Deleting an unknown id is not an error.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: Uuid) -> Result<bool, FavoritesError> {
        let before = self.favorites.len();
        self.favorites.retain(|favorite| favorite.id != id);
        if self.favorites.len() == before {
            debug!("favorite not present");
            return Ok(false);
        }
        self.flush()?;
        info!("favorite deleted");
        Ok(true)
    }

    fn flush(&self) -> Result<(), FavoritesError> {
        persistence::save_json(&self.path, &self.favorites)?;
        Ok(())
    }
}
