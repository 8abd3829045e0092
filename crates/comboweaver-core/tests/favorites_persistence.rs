use comboweaver_core::{
    FavoritesError, FavoritesStore, SessionSnapshot, load_session, save_session,
};

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(ToString::to_string).collect()
}

#[test]
fn saved_favorites_survive_reload() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("nested").join("favorites.json");

    let mut store = FavoritesStore::load(&path).expect("missing file should load empty");
    assert!(store.all().is_empty());
    let saved = store
        .save("Corner route", "ryu", ids(&["ryu-001", "ryu-002"]))
        .expect("favorite should save");
    store
        .save("Ken punish", "ken", ids(&["ken-003"]))
        .expect("favorite should save");

    let reloaded = FavoritesStore::load(&path).expect("saved file should load");
    assert_eq!(reloaded.all().len(), 2);
    assert_eq!(reloaded.get(saved.id), Some(&saved));
    let ryu: Vec<_> = reloaded.for_character("ryu").collect();
    assert_eq!(ryu.len(), 1);
    assert_eq!(ryu[0].part_ids, ids(&["ryu-001", "ryu-002"]));
}

#[test]
fn blank_name_and_empty_sequence_are_rejected() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("favorites.json");
    let mut store = FavoritesStore::load(&path).expect("missing file should load empty");

    assert!(matches!(
        store.save("   ", "ryu", ids(&["ryu-001"])),
        Err(FavoritesError::EmptyName)
    ));
    assert!(matches!(
        store.save("Nothing", "ryu", Vec::new()),
        Err(FavoritesError::EmptySequence)
    ));
    assert!(!path.exists());
}

#[test]
fn delete_is_idempotent() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("favorites.json");
    let mut store = FavoritesStore::load(&path).expect("missing file should load empty");
    let saved = store
        .save("Route", "ryu", ids(&["ryu-004"]))
        .expect("favorite should save");

    assert!(store.delete(saved.id).expect("delete should succeed"));
    assert!(!store.delete(saved.id).expect("second delete should succeed"));

    let reloaded = FavoritesStore::load(&path).expect("saved file should load");
    assert!(reloaded.all().is_empty());
}

#[test]
fn corrupt_favorites_file_is_moved_aside() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("favorites.json");
    std::fs::write(&path, b"[{\"id\": truncated").expect("writing corrupt payload should work");

    let store = FavoritesStore::load(&path).expect("corrupt file should load empty");

    assert!(store.all().is_empty());
    assert!(!path.exists());
    assert!(temp.path().join("favorites.json.corrupt").exists());
}

#[test]
fn session_roundtrip_and_missing_session() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("session.json");

    assert_eq!(load_session(&path).expect("missing session should load"), None);

    let snapshot = SessionSnapshot::new("ryu", ids(&["ryu-005", "ryu-001"]));
    save_session(&path, &snapshot).expect("session should save");

    let restored = load_session(&path)
        .expect("saved session should load")
        .expect("session should be present");
    assert_eq!(restored, snapshot);
}

#[test]
fn corrupt_session_is_treated_as_absent() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("session.json");
    std::fs::write(&path, b"{not json").expect("writing corrupt payload should work");

    assert_eq!(load_session(&path).expect("corrupt session should load"), None);
    assert!(temp.path().join("session.json.corrupt").exists());
}
