use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::read_api_keys_conf;
use crate::gallery::kv::KeyValueStore;

pub const API_KEY_STORE_KEY: &str = "forge_api_key";
const GEMINI_SETTINGS_PATH: &str = ".gemini/settings.json";
const HOME_KEY_FILE_PATH: &str = ".forge-kingdom/gemini_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Argument,
    Saved,
    ConfFile,
    Environment,
    GeminiSettings,
    HomeKeyFile,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// `GEMINI_API_KEY` from the Gemini CLI settings file under `home`.
fn read_gemini_settings(home: &Path) -> Option<String> {
    let path = home.join(GEMINI_SETTINGS_PATH);
    let content = fs::read_to_string(&path).ok()?;
    let settings: Value = match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            debug!("Ignoring unreadable {}: {err}", path.display());
            return None;
        }
    };
    non_empty(settings.get("GEMINI_API_KEY").and_then(Value::as_str))
}

fn read_home_key_file(home: &Path) -> Option<String> {
    let content = fs::read_to_string(home.join(HOME_KEY_FILE_PATH)).ok()?;
    non_empty(Some(content.as_str()))
}

/// Picks the API key from, in order: the explicit argument, the saved key,
/// the `api-keys.conf` file, the environment, then `~/.gemini/settings.json`
/// and `~/.forge-kingdom/gemini_key` when a home directory is known.
pub fn resolve_credential(
    explicit: Option<&str>,
    store: &dyn KeyValueStore,
    conf_path: &Path,
    env_key: Option<&str>,
    home: Option<&Path>,
) -> Option<(String, CredentialSource)> {
    if let Some(key) = non_empty(explicit) {
        return Some((key, CredentialSource::Argument));
    }

    match store.get(API_KEY_STORE_KEY) {
        Ok(saved) => {
            if let Some(key) = non_empty(saved.as_deref()) {
                return Some((key, CredentialSource::Saved));
            }
        }
        Err(err) => warn!("Failed to read saved API key: {err}"),
    }

    if let Some(key) = non_empty(read_api_keys_conf(conf_path).as_deref()) {
        return Some((key, CredentialSource::ConfFile));
    }

    if let Some(key) = non_empty(env_key) {
        return Some((key, CredentialSource::Environment));
    }

    let home = home?;
    if let Some(key) = read_gemini_settings(home) {
        return Some((key, CredentialSource::GeminiSettings));
    }
    read_home_key_file(home).map(|key| (key, CredentialSource::HomeKeyFile))
}

pub fn save_credential(store: &dyn KeyValueStore, credential: &str) {
    let credential = credential.trim();
    if credential.is_empty() {
        return;
    }
    match store.set(API_KEY_STORE_KEY, credential) {
        Ok(()) => info!("Saved API key for later sessions"),
        Err(err) => warn!("Failed to save API key: {err}"),
    }
}
