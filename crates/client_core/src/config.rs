use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use url::Url;

pub const SETTINGS_FILE: &str = "aqi.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_base_url: String,
    pub timeout: Duration,
    pub default_city: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".into(),
            timeout: Duration::from_millis(7000),
            default_city: "Delhi".into(),
        }
    }
}

pub fn load_settings() -> anyhow::Result<ProviderSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Layers `path` (if readable) and then `env` over the defaults.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ProviderSettings> {
    let mut settings = ProviderSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("invalid settings file {}", path.display()))?;
        if let Some(v) = file_cfg.get("api_base_url") {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("timeout_ms") {
            settings.timeout = parse_timeout(v)?;
        }
        if let Some(v) = file_cfg.get("default_city") {
            settings.default_city = v.clone();
        }
    }

    if let Some(v) = env("AQI_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__TIMEOUT_MS") {
        settings.timeout = parse_timeout(&v)?;
    }
    if let Some(v) = env("APP__DEFAULT_CITY") {
        settings.default_city = v;
    }

    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(ProviderSettings::default().api_base_url);
    }

    let parsed = Url::parse(raw).with_context(|| format!("invalid api base url: {raw}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("api base url must start with http:// or https://"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_timeout(raw: &str) -> anyhow::Result<Duration> {
    let millis = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid timeout_ms: {raw}"))?;
    if millis == 0 {
        return Err(anyhow!("timeout_ms must be positive"));
    }
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
