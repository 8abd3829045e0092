use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{model::SequenceEntry, sequence::SequenceStore};

pub const LONG_PRESS_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    #[error("drop target {to_index} is outside 0..={len}")]
    TargetOutOfRange { to_index: usize, len: usize },
}

/// Moves `dragged_id` so it lands just before the item that is at `to_index`
/// in the list as it was before removal. `to_index == len` moves to the end.
///
/// Returns `Ok(false)` when the entry is unknown or the move leaves the order
/// unchanged.
pub fn relocate(
    entries: &mut Vec<SequenceEntry>,
    dragged_id: &str,
    to_index: usize,
) -> Result<bool, ReorderError> {
    let len = entries.len();
    if to_index > len {
        return Err(ReorderError::TargetOutOfRange { to_index, len });
    }
    let Some(from_index) = entries.iter().position(|entry| entry.entry_id == dragged_id) else {
        return Ok(false);
    };

    let adjusted = if from_index < to_index {
        to_index - 1
    } else {
        to_index
    };
    if adjusted == from_index {
        return Ok(false);
    }

    let entry = entries.remove(from_index);
    entries.insert(adjusted, entry);
    Ok(true)
}

/// Vertical extent of one rendered sequence row, in the same coordinate space
/// as the pointer/touch events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowBounds {
    pub top: f64,
    pub height: f64,
}

impl RowBounds {
    #[must_use]
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Insertion index for a pointer at `y` over row `row_index`.
#[must_use]
pub fn target_for_row(row_index: usize, bounds: RowBounds, y: f64) -> usize {
    if y < bounds.midpoint() {
        row_index
    } else {
        row_index + 1
    }
}

/// Insertion index for a touch at `y`, given every rendered row top to bottom.
#[must_use]
pub fn target_for_rows(rows: &[RowBounds], y: f64) -> usize {
    rows.iter()
        .position(|row| y < row.midpoint())
        .unwrap_or(rows.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragSource {
    Pointer,
    Touch,
}

/// Identifies one long-press timer. Only the most recent token can arm a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LongPressToken(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReorderState {
    pub dragged_entry_id: Option<String>,
    pub drop_target_index: Option<usize>,
    pub scroll_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DropOutcome {
    Moved { entry_id: String, to_index: usize },
    Unchanged,
    NoDrag,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    entry_id: String,
    source: DragSource,
    target: Option<usize>,
}

#[derive(Debug, Clone)]
struct PendingPress {
    token: LongPressToken,
    entry_id: String,
}

#[derive(Debug, Clone)]
pub struct ReorderController {
    drag: Option<ActiveDrag>,
    pending: Option<PendingPress>,
    next_token: u64,
    long_press_delay: Duration,
}

impl Default for ReorderController {
    fn default() -> Self {
        Self::new(LONG_PRESS_DELAY)
    }
}

impl ReorderController {
    #[must_use]
    pub fn new(long_press_delay: Duration) -> Self {
        Self {
            drag: None,
            pending: None,
            next_token: 0,
            long_press_delay,
        }
    }

    #[must_use]
    pub fn long_press_delay(&self) -> Duration {
        self.long_press_delay
    }

    #[must_use]
    pub fn state(&self) -> ReorderState {
        match &self.drag {
            Some(drag) => ReorderState {
                dragged_entry_id: Some(drag.entry_id.clone()),
                drop_target_index: drag.target,
                scroll_locked: drag.source == DragSource::Touch,
            },
            None => ReorderState::default(),
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn scroll_locked(&self) -> bool {
        self.drag
            .as_ref()
            .is_some_and(|drag| drag.source == DragSource::Touch)
    }

    #[instrument(skip(self))]
    pub fn pointer_down(&mut self, entry_id: &str) {
        self.pending = None;
        self.drag = Some(ActiveDrag {
            entry_id: entry_id.to_string(),
            source: DragSource::Pointer,
            target: None,
        });
        debug!("pointer drag started");
    }

    /// Pointer moved over a rendered row. Hovering the dragged row itself
    /// leaves the current target alone.
    pub fn pointer_over(&mut self, row_index: usize, row_entry_id: &str, bounds: RowBounds, y: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if drag.source != DragSource::Pointer || drag.entry_id == row_entry_id {
            return;
        }
        drag.target = Some(target_for_row(row_index, bounds, y));
    }

    /// Pointer left the list container. The drag stays alive but has no target.
    pub fn pointer_leave(&mut self) {
        if let Some(drag) = self.drag.as_mut() {
            drag.target = None;
        }
    }

    pub fn pointer_up(&mut self, store: &mut SequenceStore) -> DropOutcome {
        self.commit(store, DragSource::Pointer)
    }

    /// Starts the long-press timer. The host schedules [`Self::long_press_delay`]
    /// and calls [`Self::long_press_elapsed`] with the returned token.
    #[instrument(skip(self))]
    pub fn touch_start(&mut self, entry_id: &str) -> LongPressToken {
        self.next_token += 1;
        let token = LongPressToken(self.next_token);
        self.pending = Some(PendingPress {
            token,
            entry_id: entry_id.to_string(),
        });
        token
    }

    /// Returns true when this timer armed a touch drag.
    #[instrument(skip(self, store))]
    pub fn long_press_elapsed(&mut self, token: LongPressToken, store: &SequenceStore) -> bool {
        let Some(pending) = self.pending.take_if(|pending| pending.token == token) else {
            debug!("stale long-press timer ignored");
            return false;
        };
        if store.position_of(&pending.entry_id).is_none() {
            debug!(entry_id = %pending.entry_id, "long-press target no longer in sequence");
            return false;
        }
        self.drag = Some(ActiveDrag {
            entry_id: pending.entry_id,
            source: DragSource::Touch,
            target: None,
        });
        info!("touch drag armed");
        true
    }

    /// Touch moved. Any pending long press is abandoned; an armed drag picks
    /// the first row whose midpoint lies below the touch point.
    pub fn touch_move(&mut self, rows: &[RowBounds], y: f64) {
        self.pending = None;
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if drag.source != DragSource::Touch {
            return;
        }
        drag.target = Some(target_for_rows(rows, y));
    }

    pub fn touch_end(&mut self, store: &mut SequenceStore) -> DropOutcome {
        self.pending = None;
        self.commit(store, DragSource::Touch)
    }

    /// Abandons any drag or pending long press without touching the sequence.
    pub fn cancel(&mut self) {
        if self.drag.is_some() || self.pending.is_some() {
            debug!("drag cancelled");
        }
        self.drag = None;
        self.pending = None;
    }

    fn commit(&mut self, store: &mut SequenceStore, source: DragSource) -> DropOutcome {
        let Some(drag) = self.drag.take() else {
            return DropOutcome::NoDrag;
        };
        self.pending = None;
        if drag.source != source {
            debug!(?source, "drop from a different gesture source ignored");
            return DropOutcome::Unchanged;
        }
        let Some(target) = drag.target else {
            return DropOutcome::Unchanged;
        };

        let len = store.len();
        let to_index = if target > len {
            warn!(target, len, "drop target beyond shrunken sequence, clamping");
            len
        } else {
            target
        };

        match store.move_entry(&drag.entry_id, to_index) {
            Ok(true) => DropOutcome::Moved {
                entry_id: drag.entry_id,
                to_index,
            },
            Ok(false) => DropOutcome::Unchanged,
            Err(error) => {
                warn!(?error, "drop rejected");
                DropOutcome::Unchanged
            }
        }
    }
}
