use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; a malformed value aborts startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Optional JSON catalog replacing the embedded `templates.json`.
    pub templates_path: Option<PathBuf>,
    /// Upper bound on the serialized `data` parameter and on any single field value.
    pub max_data_bytes: usize,
    pub max_entries_per_section: usize,
    /// Print sample text for fields the user left blank.
    pub render_placeholders: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            templates_path: None,
            max_data_bytes: 64 * 1024,
            max_entries_per_section: 20,
            render_placeholders: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            templates_path: std::env::var("TEMPLATES_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            max_data_bytes: parse_env("MAX_DATA_BYTES", defaults.max_data_bytes)?,
            max_entries_per_section: parse_env(
                "MAX_ENTRIES_PER_SECTION",
                defaults.max_entries_per_section,
            )?,
            render_placeholders: parse_env("RENDER_PLACEHOLDERS", defaults.render_placeholders)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
