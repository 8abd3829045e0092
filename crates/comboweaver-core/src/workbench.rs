use std::{collections::BTreeMap, sync::Arc, time::Duration};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    catalog::CharacterCatalog,
    favorites::{FavoriteCombo, FavoritesError, FavoritesStore},
    filter::{TagCategory, TagFilter, available_tags, filter_parts},
    media::{EmbedReadiness, MediaBackend, MediaEvent},
    model::{ComboStats, Part, SequenceEntry},
    playback::{PlaybackConfig, PlaybackController, PlaybackPhase, PlaybackStatus},
    reorder::{DropOutcome, LongPressToken, ReorderController, ReorderState, RowBounds},
    sequence::SequenceStore,
    session::SessionSnapshot,
    share::SharePayload,
    suggest::AcceptedSuggestion,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkbenchError {
    #[error("unknown part id: {0}")]
    UnknownPart(String),
    #[error("unknown sample combo: {0}")]
    UnknownSample(String),
    #[error("combo belongs to {found}, current character is {expected}")]
    CharacterMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchStatus {
    pub character: String,
    pub playback: PlaybackStatus,
    pub reorder: ReorderState,
    pub sequence_len: usize,
    pub revision: u64,
}

/// Everything one combo-building screen needs, wired together.
///
/// Playback is hard-stopped before any change to the sequence, and an active
/// drag is dropped before a remove, clear or replace.
#[derive(Debug)]
pub struct Workbench<B: MediaBackend> {
    catalog: CharacterCatalog,
    filter: TagFilter,
    sequence: SequenceStore,
    playback: PlaybackController<B>,
    reorder: ReorderController,
}

impl<B: MediaBackend> Workbench<B> {
    #[must_use]
    pub fn new(catalog: CharacterCatalog, backend: B, readiness: EmbedReadiness) -> Self {
        Self::with_settings(
            catalog,
            backend,
            readiness,
            PlaybackConfig::default(),
            crate::reorder::LONG_PRESS_DELAY,
        )
    }

    #[must_use]
    pub fn with_settings(
        catalog: CharacterCatalog,
        backend: B,
        readiness: EmbedReadiness,
        playback: PlaybackConfig,
        long_press_delay: Duration,
    ) -> Self {
        Self {
            catalog,
            filter: TagFilter::new(),
            sequence: SequenceStore::new(),
            playback: PlaybackController::with_config(backend, readiness, playback),
            reorder: ReorderController::new(long_press_delay),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CharacterCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn character(&self) -> &str {
        self.catalog.character()
    }

    #[must_use]
    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    #[must_use]
    pub fn sequence(&self) -> &SequenceStore {
        &self.sequence
    }

    #[must_use]
    pub fn entries(&self) -> &[SequenceEntry] {
        self.sequence.snapshot()
    }

    #[must_use]
    pub fn playback(&self) -> &PlaybackController<B> {
        &self.playback
    }

    #[must_use]
    pub fn reorder(&self) -> &ReorderController {
        &self.reorder
    }

    #[must_use]
    pub fn stats(&self) -> ComboStats {
        self.sequence.stats()
    }

    #[must_use]
    pub fn status(&self) -> WorkbenchStatus {
        WorkbenchStatus {
            character: self.catalog.character().to_string(),
            playback: self.playback.status(),
            reorder: self.reorder.state(),
            sequence_len: self.sequence.len(),
            revision: self.sequence.revision(),
        }
    }

    /// Switches to another character's catalog. Filters, the sequence and
    /// playback all start over.
    #[instrument(skip(self, catalog), fields(from = self.catalog.character(), to = catalog.character()))]
    pub fn select_character(&mut self, catalog: CharacterCatalog) {
        self.playback.hard_stop();
        self.reorder.cancel();
        self.filter.reset();
        self.sequence.clear();
        self.catalog = catalog;
        info!("character selected");
    }

    pub fn toggle_tag(&mut self, category: TagCategory, tag: &str) -> bool {
        self.filter.toggle(category, tag)
    }

    pub fn reset_filters(&mut self) {
        self.filter.reset();
    }

    #[must_use]
    pub fn filtered_parts(&self) -> Vec<Arc<Part>> {
        filter_parts(self.catalog.parts(), &self.filter)
    }

    #[must_use]
    pub fn available_tags(&self) -> BTreeMap<TagCategory, Vec<String>> {
        available_tags(self.catalog.parts())
    }

    #[instrument(skip(self))]
    pub fn add_part(&mut self, part_id: &str) -> Result<SequenceEntry, WorkbenchError> {
        let part = self
            .catalog
            .find(part_id)
            .ok_or_else(|| WorkbenchError::UnknownPart(part_id.to_string()))?;
        self.playback.hard_stop();
        Ok(self.sequence.append(part))
    }

    /// Unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn remove_entry(&mut self, entry_id: &str) -> bool {
        self.playback.hard_stop();
        self.reorder.cancel();
        self.sequence.remove_by_entry_id(entry_id)
    }

    pub fn clear(&mut self) {
        self.playback.hard_stop();
        self.reorder.cancel();
        self.sequence.clear();
    }

    /// Returns how many parts were loaded; ids missing from the catalog are skipped.
    #[instrument(skip(self))]
    pub fn load_sample(&mut self, name: &str) -> Result<usize, WorkbenchError> {
        let sample = self
            .catalog
            .sample(name)
            .ok_or_else(|| WorkbenchError::UnknownSample(name.to_string()))?;
        let parts = self.catalog.resolve(&sample.part_ids);
        Ok(self.replace(parts))
    }

    pub fn load_favorite(&mut self, favorite: &FavoriteCombo) -> Result<usize, WorkbenchError> {
        self.load_ids(&favorite.character, &favorite.part_ids)
    }

    pub fn restore_share(&mut self, payload: &SharePayload) -> Result<usize, WorkbenchError> {
        self.load_ids(&payload.character, &payload.part_ids)
    }

    pub fn restore_session(&mut self, snapshot: &SessionSnapshot) -> Result<usize, WorkbenchError> {
        self.load_ids(&snapshot.character, &snapshot.part_ids)
    }

    pub fn load_suggestion(&mut self, suggestion: AcceptedSuggestion) -> usize {
        debug!(explanation = %suggestion.explanation, "loading suggestion");
        self.replace(suggestion.parts)
    }

    #[must_use]
    pub fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.catalog.character(), self.sequence.part_ids())
    }

    #[must_use]
    pub fn share_payload(&self) -> SharePayload {
        SharePayload::new(self.catalog.character(), self.sequence.part_ids())
    }

    pub fn save_favorite(
        &self,
        favorites: &mut FavoritesStore,
        name: &str,
    ) -> Result<FavoriteCombo, FavoritesError> {
        favorites.save(name, self.catalog.character(), self.sequence.part_ids())
    }

    pub fn play_pause_toggle(&mut self) {
        if self.playback.phase() == PlaybackPhase::Playing {
            self.playback.pause(&self.sequence);
        } else {
            self.playback.play(&self.sequence);
        }
    }

    pub fn play(&mut self) {
        self.playback.play(&self.sequence);
    }

    pub fn pause(&mut self) {
        self.playback.pause(&self.sequence);
    }

    pub fn rewind(&mut self) -> Option<f64> {
        self.playback.rewind(&self.sequence)
    }

    pub fn stop(&mut self) {
        self.playback.hard_stop();
    }

    pub fn handle_media_event(&mut self, event: MediaEvent) {
        self.playback.handle_event(&self.sequence, event);
    }

    pub fn notify_embed_ready(&mut self) {
        self.playback.notify_embed_ready(&self.sequence);
    }

    pub fn pointer_down(&mut self, entry_id: &str) {
        self.reorder.pointer_down(entry_id);
    }

    pub fn pointer_over(&mut self, row_index: usize, row_entry_id: &str, bounds: RowBounds, y: f64) {
        self.reorder.pointer_over(row_index, row_entry_id, bounds, y);
    }

    pub fn pointer_leave(&mut self) {
        self.reorder.pointer_leave();
    }

    pub fn pointer_up(&mut self) -> DropOutcome {
        self.stop_before_drop();
        self.reorder.pointer_up(&mut self.sequence)
    }

    pub fn touch_start(&mut self, entry_id: &str) -> LongPressToken {
        self.reorder.touch_start(entry_id)
    }

    pub fn long_press_elapsed(&mut self, token: LongPressToken) -> bool {
        self.reorder.long_press_elapsed(token, &self.sequence)
    }

    pub fn touch_move(&mut self, rows: &[RowBounds], y: f64) {
        self.reorder.touch_move(rows, y);
    }

    pub fn touch_end(&mut self) -> DropOutcome {
        self.stop_before_drop();
        self.reorder.touch_end(&mut self.sequence)
    }

    pub fn cancel_drag(&mut self) {
        self.reorder.cancel();
    }

    fn stop_before_drop(&mut self) {
        if self.reorder.state().drop_target_index.is_some() {
            self.playback.hard_stop();
        }
    }

    fn load_ids(&mut self, character: &str, part_ids: &[String]) -> Result<usize, WorkbenchError> {
        if character != self.catalog.character() {
            return Err(WorkbenchError::CharacterMismatch {
                expected: self.catalog.character().to_string(),
                found: character.to_string(),
            });
        }
        let parts = self.catalog.resolve(part_ids);
        if parts.len() != part_ids.len() {
            warn!(
                requested = part_ids.len(),
                loaded = parts.len(),
                "some saved parts are no longer in the catalog"
            );
        }
        Ok(self.replace(parts))
    }

    fn replace(&mut self, parts: Vec<Arc<Part>>) -> usize {
        self.playback.hard_stop();
        self.reorder.cancel();
        let count = parts.len();
        self.sequence.replace_with_parts(parts);
        count
    }
}
