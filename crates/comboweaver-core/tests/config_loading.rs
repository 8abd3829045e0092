use std::time::Duration;

use comboweaver_core::AppConfig;

#[test]
fn config_file_overrides_selected_values() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("comboweaver.config.toml");
    std::fs::write(
        &path,
        "[playback]\npoll_interval_ms = 250\n\n[reorder]\nlong_press_ms = 450\n\n[paths]\ncatalog_dir = \"/srv/catalogs\"\n",
    )
    .expect("writing config should work");

    let config = AppConfig::load_from(&path).expect("config should load");

    let playback = config.playback.to_playback_config();
    assert_eq!(playback.poll_interval, Duration::from_millis(250));
    assert_eq!(playback.rewind_seconds, 5.0);
    assert_eq!(config.reorder.long_press_delay(), Duration::from_millis(450));
    assert_eq!(config.paths.catalog_dir, std::path::PathBuf::from("/srv/catalogs"));
    assert_eq!(config.paths.logs_dir, std::path::PathBuf::from("logs"));
    assert_eq!(config.diagnostics.trace_file_prefix, "comboweaver");
}

#[test]
fn malformed_config_is_an_error() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("comboweaver.config.toml");
    std::fs::write(&path, "[playback\nrewind_seconds = ").expect("writing config should work");

    let error = AppConfig::load_from(&path).expect_err("broken toml should fail");
    assert!(format!("{error:#}").contains("failed to parse config TOML"));
}

#[test]
fn nonpositive_rewind_falls_back_to_default() {
    let config: AppConfig =
        toml::from_str("[playback]\nrewind_seconds = -2.0\n").expect("config should parse");
    assert_eq!(config.playback.to_playback_config().rewind_seconds, 5.0);
}

#[test]
fn console_logging_can_be_disabled() {
    let config: AppConfig =
        toml::from_str("[diagnostics]\nconsole = false\n").expect("config should parse");
    assert!(!config.diagnostics.console);
    assert_eq!(config.diagnostics.trace_file_prefix, "comboweaver");
    assert!(AppConfig::default().diagnostics.console);
}
