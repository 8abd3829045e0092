use std::collections::HashSet;

use comboweaver_core::{SequenceStore, fixtures::demo_catalog};

#[test]
fn appending_the_same_part_twice_gives_distinct_entries() {
    let catalog = demo_catalog();
    let part = catalog.find("ryu-001").expect("fixture part should exist");
    let mut store = SequenceStore::new();

    let first = store.append(part.clone());
    let second = store.append(part);

    assert_ne!(first.entry_id, second.entry_id);
    assert_eq!(store.part_ids(), vec!["ryu-001", "ryu-001"]);
    assert_eq!(store.len(), 2);
}

#[test]
fn removal_of_unknown_entry_is_benign() {
    let catalog = demo_catalog();
    let mut store = SequenceStore::new();
    let entry = store.append(catalog.find("ryu-002").expect("fixture part should exist"));
    let revision = store.revision();

    assert!(!store.remove_by_entry_id("nope#99"));
    assert_eq!(store.revision(), revision);
    assert!(store.remove_by_entry_id(&entry.entry_id));
    assert!(!store.remove_by_entry_id(&entry.entry_id));
    assert!(store.is_empty());
}

#[test]
fn replace_all_without_ids_never_collides_with_prior_entries() {
    let catalog = demo_catalog();
    let mut store = SequenceStore::new();
    for part in catalog.parts() {
        store.append(part.clone());
    }
    let prior: HashSet<String> = store
        .snapshot()
        .iter()
        .map(|entry| entry.entry_id.clone())
        .collect();

    store.replace_with_parts(catalog.parts().to_vec());

    let replaced: HashSet<String> = store
        .snapshot()
        .iter()
        .map(|entry| entry.entry_id.clone())
        .collect();
    assert_eq!(replaced.len(), catalog.parts().len());
    assert!(prior.is_disjoint(&replaced));
}

#[test]
fn replace_all_keeps_supplied_ids() {
    let catalog = demo_catalog();
    let mut store = SequenceStore::new();
    let part = catalog.find("ryu-003").expect("fixture part should exist");

    store.replace_all(vec![
        (part.clone(), Some("keep-me".to_string())),
        (part, Some(String::new())),
    ]);

    let snapshot = store.snapshot();
    assert_eq!(snapshot[0].entry_id, "keep-me");
    assert!(!snapshot[1].entry_id.is_empty());
    assert_ne!(snapshot[1].entry_id, "keep-me");
}

#[test]
fn snapshot_part_ids_rebuild_an_equivalent_sequence() {
    let catalog = demo_catalog();
    let mut recorded = SequenceStore::new();
    for id in ["ryu-004", "ryu-001", "ryu-004"] {
        recorded.append(catalog.find(id).expect("fixture part should exist"));
    }

    let mut restored = SequenceStore::new();
    restored.replace_with_parts(catalog.resolve(&recorded.part_ids()));

    assert_eq!(restored.part_ids(), recorded.part_ids());
    assert_eq!(restored.stats(), recorded.stats());
}

#[test]
fn stats_follow_the_current_order() {
    let catalog = demo_catalog();
    let mut store = SequenceStore::new();
    store.append(catalog.find("ryu-001").expect("fixture part should exist"));
    let tail = store.append(catalog.find("ryu-002").expect("fixture part should exist"));

    let stats = store.stats();
    assert_eq!(stats.total_damage, 1_270 + 2_110);
    assert_eq!(stats.final_frame_advantage, Some(2));

    store
        .move_entry(&tail.entry_id, 0)
        .expect("target should be in range");
    assert_eq!(store.stats().final_frame_advantage, Some(19));

    store.clear();
    assert_eq!(store.stats().total_damage, 0);
    assert_eq!(store.stats().final_frame_advantage, None);
}

#[test]
fn append_after_restoring_fixed_ids_keeps_ids_unique() {
    let catalog = demo_catalog();
    let part = catalog.find("ryu-001").expect("fixture part should exist");
    let mut store = SequenceStore::new();
    store.replace_all(vec![
        (part.clone(), Some("ryu-001#1".to_string())),
        (part.clone(), Some("ryu-001#2".to_string())),
    ]);

    let appended = store.append(part);

    let ids: HashSet<String> = store
        .snapshot()
        .iter()
        .map(|entry| entry.entry_id.clone())
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(store.remove_by_entry_id(&appended.entry_id));
    assert_eq!(store.len(), 2);
    assert_eq!(
        store.position_of("ryu-001#1"),
        Some(0),
        "restored entries should survive removing the appended one"
    );
}
