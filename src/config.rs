use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::catalog::DEFAULT_IMAGE_MODEL;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEYS_CONF_FILE: &str = "api-keys.conf";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub data_dir: PathBuf,
    pub database_url: String,
    pub api_base_url: String,
    pub image_model: String,
    pub http_timeout_seconds: u64,
    pub env_api_key: Option<String>,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn normalize_database_url(value: String) -> String {
    if value.starts_with("sqlite+aiosqlite://") {
        return value.replacen("sqlite+aiosqlite://", "sqlite://", 1);
    }
    value
}

fn normalize_base_url(value: String) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        warn!("GEMINI_API_BASE_URL is empty; using {}", DEFAULT_API_BASE_URL);
        return DEFAULT_API_BASE_URL.to_string();
    }
    trimmed.to_string()
}

/// Reads `KEY=value` pairs, skipping blank lines, `#` comments and empty values.
pub fn parse_key_file(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

/// Looks up `GEMINI_API_KEY` in an `api-keys.conf` file, if one exists.
pub fn read_api_keys_conf(path: &Path) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return None,
    };
    let key = parse_key_file(&content)
        .into_iter()
        .find(|(key, _)| key == "GEMINI_API_KEY")
        .map(|(_, value)| value);
    if key.is_some() {
        info!("Using Gemini API key from {}", path.display());
    }
    key
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = PathBuf::from(env_string("FORGE_DATA_DIR", "forge_data"));
        let default_database_url = format!("sqlite://{}", data_dir.join("gallery.db").display());

        let mut image_model = env_string("FORGE_IMAGE_MODEL", DEFAULT_IMAGE_MODEL)
            .trim()
            .to_string();
        if image_model.is_empty() {
            image_model = DEFAULT_IMAGE_MODEL.to_string();
        }

        Ok(Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            database_url: normalize_database_url(env_string(
                "DATABASE_URL",
                &default_database_url,
            )),
            data_dir,
            api_base_url: normalize_base_url(env_string(
                "GEMINI_API_BASE_URL",
                DEFAULT_API_BASE_URL,
            )),
            image_model,
            http_timeout_seconds: env_u64("HTTP_TIMEOUT_SECONDS", 60).max(1),
            env_api_key: env_non_empty("GEMINI_API_KEY").or_else(|| env_non_empty("GOOGLE_API_KEY")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_file_skips_comments_and_empty_values() {
        let parsed = parse_key_file(
            "# Forge keys\n\nGEMINI_API_KEY = AIza-test-key\nOPENAI_API_KEY=\nbroken line\n",
        );
        assert_eq!(
            parsed,
            vec![("GEMINI_API_KEY".to_string(), "AIza-test-key".to_string())]
        );
    }

    #[test]
    fn reads_gemini_key_from_conf_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(API_KEYS_CONF_FILE);
        fs::write(&path, "GEMINI_API_KEY=from-file\n").expect("write conf");
        assert_eq!(read_api_keys_conf(&path).as_deref(), Some("from-file"));
        assert_eq!(read_api_keys_conf(&dir.path().join("missing.conf")), None);
    }

    #[test]
    fn normalizes_legacy_sqlite_urls() {
        assert_eq!(
            normalize_database_url("sqlite+aiosqlite:///gallery.db".to_string()),
            "sqlite:///gallery.db"
        );
        assert_eq!(
            normalize_base_url("https://example.test/v1beta/".to_string()),
            "https://example.test/v1beta"
        );
    }
}
