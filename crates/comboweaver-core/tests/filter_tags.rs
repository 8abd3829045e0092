use std::sync::Arc;

use comboweaver_core::{
    Part, PartPredicate, TagCategory, TagFilter, available_tags, filter_parts,
    fixtures::demo_catalog,
};

fn ids(parts: &[Arc<Part>]) -> Vec<&str> {
    parts.iter().map(|part| part.id.as_str()).collect()
}

#[test]
fn inactive_filter_offers_every_part() {
    let catalog = demo_catalog();
    let filter = TagFilter::new();
    assert!(!filter.is_active());
    assert_eq!(filter_parts(catalog.parts(), &filter).len(), catalog.parts().len());
}

#[test]
fn single_valued_category_uses_set_membership() {
    let catalog = demo_catalog();
    let mut filter = TagFilter::new();
    filter.toggle(TagCategory::Kind, "starter");
    filter.toggle(TagCategory::Kind, "ender");

    let offered = filter_parts(catalog.parts(), &filter);
    assert_eq!(ids(&offered), vec!["ryu-001", "ryu-005"]);
}

#[test]
fn conditions_require_every_selected_tag() {
    let catalog = demo_catalog();
    let mut filter = TagFilter::new();
    filter.toggle(TagCategory::Condition, "corner");
    filter.toggle(TagCategory::Condition, "midscreen");

    let offered = filter_parts(catalog.parts(), &filter);
    assert_eq!(ids(&offered), vec!["ryu-002"]);
}

#[test]
fn categories_combine_with_and() {
    let catalog = demo_catalog();
    let mut filter = TagFilter::new();
    filter.toggle(TagCategory::Kind, "extender");
    filter.toggle(TagCategory::DriveGauge, "0");

    let offered = filter_parts(catalog.parts(), &filter);
    assert_eq!(ids(&offered), vec!["ryu-003"]);
}

#[test]
fn toggling_twice_deselects() {
    let mut filter = TagFilter::new();
    assert!(filter.toggle(TagCategory::SaGauge, "3"));
    assert!(filter.is_selected(TagCategory::SaGauge, "3"));
    assert!(!filter.toggle(TagCategory::SaGauge, "3"));
    assert!(!filter.is_active());
}

#[test]
fn untagged_parts_fail_active_filters() {
    let bare = Arc::new(Part::new("ryu-900", "ryu", "5LP", "media/5lp.mp4"));
    let mut filter = TagFilter::new();
    filter.toggle(TagCategory::StartCondition, "neutral");
    assert!(!filter.matches(&bare));
}

#[test]
fn available_tags_sort_gauges_numerically() {
    let mut parts = demo_catalog().parts().to_vec();
    let mut extra = Part::new("ryu-010", "ryu", "Drive Impact", "media/di.mp4");
    extra.tags.drive_gauge = Some("10".to_string());
    parts.push(Arc::new(extra));

    let tags = available_tags(&parts);

    assert_eq!(tags[&TagCategory::DriveGauge], vec!["0", "2", "3", "10"]);
    assert_eq!(
        tags[&TagCategory::Condition],
        vec!["corner", "midscreen", "punish counter"]
    );
    assert_eq!(tags[&TagCategory::Kind], vec!["ender", "extender", "starter"]);
}

struct DamageAtLeast(i32);

impl PartPredicate for DamageAtLeast {
    fn matches(&self, part: &Part) -> bool {
        part.damage.is_some_and(|damage| damage >= self.0)
    }
}

#[test]
fn custom_predicates_plug_in() {
    let catalog = demo_catalog();
    let offered = filter_parts(catalog.parts(), &DamageAtLeast(2_000));
    assert_eq!(ids(&offered), vec!["ryu-002", "ryu-005"]);
}
