use super::{load_settings_from, Map, Settings};

use std::{
    env, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_of(pairs: &[(&str, &str)]) -> Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("banner_server_config_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("banners.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn missing_file() -> PathBuf {
    env::temp_dir().join("banner_server_config_missing").join("banners.toml")
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(&missing_file(), Map::new()).expect("settings");
    let defaults = Settings::default();

    assert_eq!(settings.bind_addr, defaults.bind_addr);
    assert_eq!(settings.admin_username, "admin");
    assert_eq!(settings.currency_prefix, "S/");
    assert!(settings.seed_demo_banners);
    assert_eq!(settings.max_upload_bytes, 16 * 1024 * 1024);
    assert_eq!(settings.session_idle_secs, 7200);
    assert_eq!(settings.max_sessions, 10_000);
    assert!(settings.gemini_api_key().is_none());
}

#[test]
fn env_overrides_file() {
    let path = temp_config(
        "bind_addr = \"0.0.0.0:9000\"\ncurrency_prefix = \"$\"\nseed_demo_banners = false\n",
    );
    let settings = load_settings_from(
        &path,
        env_of(&[("APP__BIND_ADDR", "127.0.0.1:7000")]),
    )
    .expect("settings");

    assert_eq!(settings.bind_addr, "127.0.0.1:7000");
    assert_eq!(settings.currency_prefix, "$");
    assert!(!settings.seed_demo_banners);

    fs::remove_dir_all(path.parent().expect("dir")).expect("cleanup");
}

#[test]
fn legacy_names_fill_in_when_app_vars_are_absent() {
    let settings = load_settings_from(
        &missing_file(),
        env_of(&[("SERVER_BIND", "0.0.0.0:8081"), ("API_KEY", "legacy-key")]),
    )
    .expect("settings");

    assert_eq!(settings.bind_addr, "0.0.0.0:8081");
    assert_eq!(settings.gemini_api_key(), Some("legacy-key"));
}

#[test]
fn app_vars_win_over_legacy_names() {
    let settings = load_settings_from(
        &missing_file(),
        env_of(&[
            ("SERVER_BIND", "0.0.0.0:8081"),
            ("APP__BIND_ADDR", "127.0.0.1:9999"),
            ("GEMINI_API_KEY", "gemini-key"),
            ("API_KEY", "legacy-key"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.bind_addr, "127.0.0.1:9999");
    assert_eq!(settings.gemini_api_key(), Some("gemini-key"));
}

#[test]
fn blank_api_key_counts_as_unset() {
    let settings = load_settings_from(
        &missing_file(),
        env_of(&[("APP__GEMINI_API_KEY", "   ")]),
    )
    .expect("settings");

    assert!(settings.gemini_api_key().is_none());
}

#[test]
fn unparseable_value_is_an_error() {
    let result = load_settings_from(
        &missing_file(),
        env_of(&[("APP__MAX_UPLOAD_BYTES", "lots")]),
    );

    assert!(result.is_err());
}

#[test]
fn session_limits_come_from_env() {
    let settings = load_settings_from(
        &missing_file(),
        env_of(&[
            ("APP__SESSION_IDLE_SECS", "600"),
            ("APP__MAX_SESSIONS", "50"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.session_idle_secs, 600);
    assert_eq!(settings.max_sessions, 50);
}
