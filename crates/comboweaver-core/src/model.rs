use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub id: String,
    pub character: String,
    pub name: String,
    pub combo_notation: String,
    pub video_url: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_window: Option<ClipWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame_advantage: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame_advantage: Option<i32>,
    #[serde(default, skip_serializing_if = "PartTags::is_empty")]
    pub tags: PartTags,
}

impl Part {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        character: impl Into<String>,
        combo_notation: impl Into<String>,
        video_url: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            character: character.into(),
            combo_notation: combo_notation.into(),
            video_url: video_url.into(),
            order: 0,
            clip_window: None,
            damage: None,
            start_frame_advantage: None,
            end_frame_advantage: None,
            tags: PartTags::default(),
        }
    }

    #[must_use]
    pub fn with_window(mut self, start: f64, end: Option<f64>) -> Self {
        self.clip_window = Some(ClipWindow { start, end });
        self
    }

    /// Window actually used for playback. Parts without one play the whole clip.
    #[must_use]
    pub fn playback_window(&self) -> ClipWindow {
        self.clip_window
            .map(ClipWindow::normalized)
            .unwrap_or_default()
    }
}

/// Inclusive sub-range of a clip in seconds. `end == None` plays to the natural end.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ClipWindow {
    pub start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl ClipWindow {
    #[must_use]
    pub fn normalized(self) -> Self {
        let start = if self.start.is_finite() {
            self.start.max(0.0)
        } else {
            0.0
        };
        let end = self.end.filter(|end| end.is_finite() && *end > start);
        Self { start, end }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PartTags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_condition: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub conditions: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_gauge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sa_gauge: Option<String>,
}

impl PartTags {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.start_condition.is_none()
            && self.conditions.is_empty()
            && self.drive_gauge.is_none()
            && self.sa_gauge.is_none()
    }
}

/// One placement of a part in the working sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEntry {
    pub entry_id: String,
    pub part: Arc<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleCombo {
    pub name: String,
    pub part_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComboStats {
    pub total_damage: i64,
    pub final_frame_advantage: Option<i32>,
}

impl ComboStats {
    #[must_use]
    pub fn from_entries(entries: &[SequenceEntry]) -> Self {
        Self {
            total_damage: entries
                .iter()
                .map(|entry| i64::from(entry.part.damage.unwrap_or_default()))
                .sum(),
            final_frame_advantage: entries
                .last()
                .and_then(|entry| entry.part.end_frame_advantage),
        }
    }
}
