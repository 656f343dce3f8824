use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::error::ForgeError;
use crate::llm::media::export_extension;
use crate::pipeline::Portrait;

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

pub fn export_file_name(portrait: &Portrait) -> String {
    let stem = WHITESPACE_RE.replace_all(portrait.name.trim(), "_");
    let stem = stem.replace(['/', '\\'], "_");
    format!("{}_portrait.{}", stem, export_extension(&portrait.mime_type))
}

/// Writes the decoded portrait into `dir`, returning the file path.
pub fn export_portrait(portrait: &Portrait, dir: &Path) -> Result<PathBuf, ForgeError> {
    let bytes = general_purpose::STANDARD
        .decode(portrait.image_base64.as_bytes())
        .map_err(|err| ForgeError::Payload(format!("Stored image is not valid base64: {err}")))?;

    fs::create_dir_all(dir).map_err(|err| {
        ForgeError::Persistence(format!("Failed to create {}: {err}", dir.display()))
    })?;
    let path = dir.join(export_file_name(portrait));
    fs::write(&path, bytes).map_err(|err| {
        ForgeError::Persistence(format!("Failed to write {}: {err}", path.display()))
    })?;

    info!(path = %path.display(), "Portrait exported");
    Ok(path)
}
