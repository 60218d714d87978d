use super::{load_settings_from, normalize_base_url, ProviderSettings};

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("aqi_settings_test_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let missing = env::temp_dir().join("aqi_settings_test_missing.toml");
    let settings = load_settings_from(&missing, env_from(&[])).expect("settings");
    assert_eq!(settings, ProviderSettings::default());
    assert_eq!(settings.timeout, Duration::from_millis(7000));
    assert_eq!(settings.default_city, "Delhi");
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "api_base_url = \"https://aqi.example.com/\"\ntimeout_ms = \"2500\"\ndefault_city = \"Singapore\"\n",
    );

    let settings = load_settings_from(&path, env_from(&[])).expect("settings");
    fs::remove_file(&path).expect("cleanup");

    assert_eq!(settings.api_base_url, "https://aqi.example.com");
    assert_eq!(settings.timeout, Duration::from_millis(2500));
    assert_eq!(settings.default_city, "Singapore");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let path = temp_settings_file("api_base_url = \"https://file.example.com\"\n");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("AQI_API_BASE_URL", "https://plain.example.com"),
            ("APP__API_BASE_URL", "https://prefixed.example.com"),
            ("APP__TIMEOUT_MS", "900"),
            ("APP__DEFAULT_CITY", "Lima"),
        ]),
    )
    .expect("settings");
    fs::remove_file(&path).expect("cleanup");

    assert_eq!(settings.api_base_url, "https://prefixed.example.com");
    assert_eq!(settings.timeout, Duration::from_millis(900));
    assert_eq!(settings.default_city, "Lima");
}

#[test]
fn rejects_invalid_timeout() {
    let missing = env::temp_dir().join("aqi_settings_test_missing.toml");
    assert!(load_settings_from(&missing, env_from(&[("APP__TIMEOUT_MS", "soon")])).is_err());
    assert!(load_settings_from(&missing, env_from(&[("APP__TIMEOUT_MS", "0")])).is_err());
}

#[test]
fn normalizes_base_urls() {
    assert_eq!(
        normalize_base_url("  http://localhost:8000/ ").expect("url"),
        "http://localhost:8000"
    );
    assert_eq!(
        normalize_base_url("").expect("url"),
        ProviderSettings::default().api_base_url
    );
    assert!(normalize_base_url("ftp://example.com").is_err());
    assert!(normalize_base_url("not a url").is_err());
}
