use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat, Map};
use image_generation::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "banners.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub admin_username: String,
    pub admin_password: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub currency_prefix: String,
    pub seed_demo_banners: bool,
    pub max_upload_bytes: usize,
    /// Visitor sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
    pub max_sessions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            admin_username: "admin".into(),
            admin_password: "password".into(),
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.into(),
            gemini_base_url: DEFAULT_BASE_URL.into(),
            currency_prefix: "S/".into(),
            seed_demo_banners: true,
            max_upload_bytes: 16 * 1024 * 1024,
            session_idle_secs: 2 * 60 * 60,
            max_sessions: 10_000,
        }
    }
}

impl Settings {
    /// The configured key, if it is set to something other than whitespace.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let env: Map<String, String> = std::env::vars().collect();
    load_settings_from(Path::new(CONFIG_FILE), env)
}

/// Defaults, then the optional TOML file, then `APP__*` variables. The
/// single-word names older deployments used (`SERVER_BIND`, `GEMINI_API_KEY`,
/// `API_KEY`) apply only where no `APP__*` variable covers the same key.
pub fn load_settings_from(path: &Path, env: Map<String, String>) -> anyhow::Result<Settings> {
    let raw = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        )
        .build()
        .with_context(|| format!("failed to read configuration from '{}'", path.display()))?;

    let mut settings: Settings = raw
        .try_deserialize()
        .context("invalid configuration value")?;

    apply_legacy_env(&mut settings, &env);
    Ok(settings)
}

fn apply_legacy_env(settings: &mut Settings, env: &Map<String, String>) {
    let lookup = |name: &str| {
        env.get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if !env.contains_key("APP__BIND_ADDR") {
        if let Some(v) = lookup("SERVER_BIND") {
            settings.bind_addr = v;
        }
    }
    if !env.contains_key("APP__GEMINI_API_KEY") {
        if let Some(v) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
            settings.gemini_api_key = Some(v);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
