use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::persistence;

/// What is needed to rebuild the working sequence after a reload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub character: String,
    pub part_ids: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn new(character: impl Into<String>, part_ids: Vec<String>) -> Self {
        Self {
            character: character.into(),
            part_ids,
            saved_at: Utc::now(),
        }
    }
}

#[instrument(skip(snapshot), fields(character = %snapshot.character, path = %path.display()))]
pub fn save_session(path: &Path, snapshot: &SessionSnapshot) -> Result<()> {
    persistence::save_json(path, snapshot)?;
    info!(parts = snapshot.part_ids.len(), "session saved");
    Ok(())
}

/// A missing or unreadable session is treated as no session.
#[instrument(fields(path = %path.display()))]
pub fn load_session(path: &Path) -> Result<Option<SessionSnapshot>> {
    let snapshot: Option<SessionSnapshot> = persistence::load_json_or_quarantine(path)?;
    if let Some(snapshot) = &snapshot {
        info!(
            character = %snapshot.character,
            parts = snapshot.part_ids.len(),
            "session restored"
        );
    }
    Ok(snapshot)
}
