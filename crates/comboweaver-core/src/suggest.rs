use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{catalog::CharacterCatalog, model::Part};

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("suggestion service unavailable: {0}")]
    Unavailable(String),
    #[error("suggestion contained no parts from the {0} catalog")]
    NoKnownParts(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionRequest {
    pub character: String,
    pub purpose: String,
    pub position: String,
    pub starter: String,
    pub drive_gauge_limit: u8,
    pub sa_gauge: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestedCombo {
    pub part_ids: Vec<String>,
    pub explanation: String,
}

/// External combo generator. Implementations see the full part list so they
/// can only answer with ids from it.
pub trait ComboSuggester {
    fn suggest(
        &self,
        request: &SuggestionRequest,
        parts: &[Arc<Part>],
    ) -> Result<SuggestedCombo, SuggestError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedSuggestion {
    pub parts: Vec<Arc<Part>>,
    pub explanation: String,
    pub dropped_ids: Vec<String>,
}

/// Keeps the ids the catalog knows, in the suggested order.
#[instrument(skip(catalog, suggestion), fields(character = catalog.character(), suggested = suggestion.part_ids.len()))]
pub fn accept_suggestion(
    catalog: &CharacterCatalog,
    suggestion: SuggestedCombo,
) -> Result<AcceptedSuggestion, SuggestError> {
    let (known, dropped_ids): (Vec<String>, Vec<String>) = suggestion
        .part_ids
        .into_iter()
        .partition(|part_id| catalog.find(part_id).is_some());
    if !dropped_ids.is_empty() {
        warn!(?dropped_ids, "suggestion referenced unknown parts");
    }
    if known.is_empty() {
        return Err(SuggestError::NoKnownParts(catalog.character().to_string()));
    }

    let parts = catalog.resolve(&known);
    info!(accepted = parts.len(), "suggestion accepted");
    Ok(AcceptedSuggestion {
        parts,
        explanation: suggestion.explanation,
        dropped_ids,
    })
}

/// Runs the suggester and validates its answer against the catalog.
pub fn request_suggestion(
    suggester: &dyn ComboSuggester,
    catalog: &CharacterCatalog,
    request: &SuggestionRequest,
) -> Result<AcceptedSuggestion, SuggestError> {
    let suggestion = suggester.suggest(request, catalog.parts())?;
    accept_suggestion(catalog, suggestion)
}
