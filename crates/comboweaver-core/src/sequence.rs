use std::{collections::HashSet, sync::Arc};

use tracing::{debug, info, instrument};

use crate::{
    model::{ComboStats, Part, SequenceEntry},
    reorder::{self, ReorderError},
};

/// Canonical owner of the working sequence.
///
/// Other components never hold on to entries between commands; they read
/// [`SequenceStore::snapshot`] again each time they need the current order.
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    entries: Vec<SequenceEntry>,
    next_serial: u64,
    revision: u64,
}

impl SequenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> &[SequenceEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SequenceEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn position_of(&self, entry_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.entry_id == entry_id)
    }

    /// Incremented on every applied mutation; no-op removes and moves leave it unchanged.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn part_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.part.id.clone())
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> ComboStats {
        ComboStats::from_entries(&self.entries)
    }

    #[instrument(skip(self, part), fields(part_id = %part.id))]
    pub fn append(&mut self, part: Arc<Part>) -> SequenceEntry {
        let entry = SequenceEntry {
            entry_id: self.fresh_entry_id(&part),
            part,
        };
        self.entries.push(entry.clone());
        self.revision += 1;
        info!(entry_id = %entry.entry_id, len = self.entries.len(), "part appended");
        entry
    }

    #[instrument(skip(self))]
    pub fn remove_by_entry_id(&mut self, entry_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.entry_id != entry_id);
        if self.entries.len() == before {
            debug!("remove ignored, entry not present");
            return false;
        }
        self.revision += 1;
        info!(len = self.entries.len(), "entry removed");
        true
    }

    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.revision += 1;
        info!("sequence cleared");
    }

    /// Replaces the whole sequence. Entries without a supplied id, or whose
    /// supplied id repeats one earlier in the same list, get a fresh id.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub fn replace_all(&mut self, entries: Vec<(Arc<Part>, Option<String>)>) {
        let mut reserved = HashSet::new();
        let accepted: Vec<Option<String>> = entries
            .iter()
            .map(|(_, fixed_id)| {
                fixed_id
                    .as_ref()
                    .filter(|id| !id.is_empty() && reserved.insert((*id).clone()))
                    .cloned()
            })
            .collect();

        let mut replacement = Vec::with_capacity(entries.len());
        for ((part, _), fixed_id) in entries.into_iter().zip(accepted) {
            let entry_id = match fixed_id {
                Some(id) => id,
                None => loop {
                    let candidate = self.fresh_entry_id(&part);
                    if reserved.insert(candidate.clone()) {
                        break candidate;
                    }
                },
            };
            replacement.push(SequenceEntry { entry_id, part });
        }

        self.entries = replacement;
        self.revision += 1;
        info!(len = self.entries.len(), "sequence replaced");
    }

    /// Convenience for loaders that only have parts; every entry gets a fresh id.
    pub fn replace_with_parts(&mut self, parts: Vec<Arc<Part>>) {
        self.replace_all(parts.into_iter().map(|part| (part, None)).collect());
    }

    #[instrument(skip(self))]
    pub fn move_entry(&mut self, entry_id: &str, to_index: usize) -> Result<bool, ReorderError> {
        let moved = reorder::relocate(&mut self.entries, entry_id, to_index)?;
        if moved {
            self.revision += 1;
            info!("entry moved");
        } else {
            debug!("move was a no-op");
        }
        Ok(moved)
    }

    /// Skips serials already taken by ids that arrived through `replace_all`.
    fn fresh_entry_id(&mut self, part: &Part) -> String {
        loop {
            self.next_serial += 1;
            let candidate = format!("{}#{}", part.id, self.next_serial);
            if self.position_of(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str) -> Arc<Part> {
        Arc::new(Part::new(id, "ryu", id, format!("https://cdn.example/{id}.mp4")))
    }

    #[test]
    fn entry_ids_are_not_reused_after_clear() {
        let mut store = SequenceStore::new();
        let first = store.append(part("a"));
        store.clear();
        let second = store.append(part("a"));
        assert_ne!(first.entry_id, second.entry_id);
    }

    #[test]
    fn replace_all_regenerates_colliding_fixed_ids() {
        let mut store = SequenceStore::new();
        store.replace_all(vec![
            (part("a"), Some("x".to_string())),
            (part("b"), Some("x".to_string())),
            (part("c"), None),
        ]);
        let ids: Vec<_> = store
            .snapshot()
            .iter()
            .map(|entry| entry.entry_id.clone())
            .collect();
        assert_eq!(ids[0], "x");
        assert_ne!(ids[1], "x");
        assert_eq!(store.part_ids(), vec!["a", "b", "c"]);
    }
}
