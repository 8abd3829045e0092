use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Part;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    Kind,
    StartCondition,
    Condition,
    DriveGauge,
    SaGauge,
}

impl TagCategory {
    pub const ALL: [Self; 5] = [
        Self::Kind,
        Self::StartCondition,
        Self::Condition,
        Self::DriveGauge,
        Self::SaGauge,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Kind => "Type",
            Self::StartCondition => "Start condition",
            Self::Condition => "Condition",
            Self::DriveGauge => "Drive gauge",
            Self::SaGauge => "SA gauge",
        }
    }

    fn values(self, part: &Part) -> Vec<&str> {
        let tags = &part.tags;
        match self {
            Self::Kind => tags.kind.as_deref().into_iter().collect(),
            Self::StartCondition => tags.start_condition.as_deref().into_iter().collect(),
            Self::Condition => tags.conditions.iter().map(String::as_str).collect(),
            Self::DriveGauge => tags.drive_gauge.as_deref().into_iter().collect(),
            Self::SaGauge => tags.sa_gauge.as_deref().into_iter().collect(),
        }
    }

    fn sorts_numerically(self) -> bool {
        matches!(self, Self::DriveGauge | Self::SaGauge)
    }
}

/// Decides whether a catalog part is offered for appending.
pub trait PartPredicate {
    fn matches(&self, part: &Part) -> bool;
}

/// Include-lists per category.
///
/// Categories are combined with AND. Within `Condition` every selected tag must
/// be present on the part; the other categories hold one value per part, which
/// must be one of the selected tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagFilter {
    selected: BTreeMap<TagCategory, BTreeSet<String>>,
}

impl TagFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the tag is selected after the toggle.
    pub fn toggle(&mut self, category: TagCategory, tag: &str) -> bool {
        let tags = self.selected.entry(category).or_default();
        let selected = if tags.remove(tag) {
            false
        } else {
            tags.insert(tag.to_string());
            true
        };
        if tags.is_empty() {
            self.selected.remove(&category);
        }
        debug!(?category, tag, selected, "tag toggled");
        selected
    }

    pub fn reset(&mut self) {
        self.selected.clear();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    #[must_use]
    pub fn is_selected(&self, category: TagCategory, tag: &str) -> bool {
        self.selected
            .get(&category)
            .is_some_and(|tags| tags.contains(tag))
    }
}

impl PartPredicate for TagFilter {
    fn matches(&self, part: &Part) -> bool {
        self.selected.iter().all(|(category, wanted)| {
            let values = category.values(part);
            if *category == TagCategory::Condition {
                wanted.iter().all(|tag| values.contains(&tag.as_str()))
            } else {
                values.iter().any(|value| wanted.contains(*value))
            }
        })
    }
}

#[must_use]
pub fn filter_parts(parts: &[Arc<Part>], predicate: &dyn PartPredicate) -> Vec<Arc<Part>> {
    parts
        .iter()
        .filter(|part| predicate.matches(part))
        .cloned()
        .collect()
}

/// Distinct tag values per category, in display order. Categories with no
/// values are omitted.
#[must_use]
pub fn available_tags(parts: &[Arc<Part>]) -> BTreeMap<TagCategory, Vec<String>> {
    let mut available = BTreeMap::new();
    for category in TagCategory::ALL {
        let distinct: BTreeSet<&str> = parts
            .iter()
            .flat_map(|part| category.values(part))
            .collect();
        if distinct.is_empty() {
            continue;
        }
        let mut values: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        if category.sorts_numerically() {
            values.sort_by_key(|value| leading_number(value));
        }
        available.insert(category, values);
    }
    available
}

fn leading_number(label: &str) -> u64 {
    label
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_labels_sort_by_embedded_number() {
        assert_eq!(leading_number("D10"), 10);
        assert_eq!(leading_number("SA2"), 2);
        assert_eq!(leading_number("none"), 0);
    }
}
