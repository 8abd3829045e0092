use comboweaver_core::{
    CatalogError, CharacterCatalog, MediaKind, MediaSource, load_catalog, load_character,
    scan_catalog_dir, fixtures::demo_catalog,
};

#[test]
fn demo_catalog_roundtrips_through_json() {
    let catalog = demo_catalog();
    let bytes = catalog.to_json().expect("catalog should serialize");

    let reloaded = CharacterCatalog::from_json(&bytes).expect("catalog json should parse");

    assert_eq!(reloaded, catalog);
    assert_eq!(reloaded.sample_combos().len(), 2);
}

#[test]
fn demo_catalog_mixes_local_and_embedded_clips() {
    let catalog = demo_catalog();
    let kinds: Vec<Option<MediaKind>> = catalog
        .parts()
        .iter()
        .map(|part| MediaSource::from_url(&part.video_url).kind())
        .collect();

    assert!(kinds.contains(&Some(MediaKind::Local)));
    assert!(kinds.contains(&Some(MediaKind::Embedded)));
    assert!(!kinds.contains(&None));
}

#[test]
fn resolve_drops_unknown_ids_and_keeps_order() {
    let catalog = demo_catalog();
    let parts = catalog.resolve(&["ryu-005", "ken-001", "ryu-001"]);
    let ids: Vec<&str> = parts.iter().map(|part| part.id.as_str()).collect();
    assert_eq!(ids, vec!["ryu-005", "ryu-001"]);
}

#[test]
fn scan_lists_valid_catalogs_and_skips_broken_files() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let root = temp.path();
    std::fs::create_dir_all(root.join("shoto")).expect("nested dir should be creatable");
    std::fs::write(
        root.join("shoto").join("ryu.json"),
        demo_catalog().to_json().expect("catalog should serialize"),
    )
    .expect("writing catalog should work");
    std::fs::write(root.join("broken.json"), b"{\"character\": ").expect("write should work");
    std::fs::write(root.join("notes.txt"), b"not a catalog").expect("write should work");

    let entries = scan_catalog_dir(root).expect("scan should succeed");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].character, "ryu");

    let catalog = load_character(root, "ryu").expect("ryu catalog should load");
    assert_eq!(catalog.parts().len(), 5);
    assert!(load_character(root, "ken").is_err());
}

#[test]
fn scan_creates_missing_directory() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let missing = temp.path().join("catalogs");

    let entries = scan_catalog_dir(&missing).expect("scan should succeed");

    assert!(entries.is_empty());
    assert!(missing.is_dir());
}

#[test]
fn parts_from_another_character_are_rejected() {
    let json = br#"{
        "character": "ryu",
        "parts": [
            { "id": "ken-001", "character": "ken", "name": "5MP", "combo_notation": "5MP", "video_url": "a.mp4" }
        ]
    }"#;
    assert!(matches!(
        CharacterCatalog::from_json(json),
        Err(CatalogError::ForeignPart { .. })
    ));
}

#[test]
fn missing_catalog_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    assert!(matches!(
        load_catalog(&temp.path().join("absent.json")),
        Err(CatalogError::Io(_))
    ));
}

#[test]
fn shipped_catalog_matches_fixture() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../data/catalogs/ryu.json");
    let shipped = load_catalog(&path).expect("shipped catalog should load");
    assert_eq!(shipped, demo_catalog());
}
