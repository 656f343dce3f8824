use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lightweight gallery listing record. Field names match previously saved data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub date: String,
}

impl GalleryEntry {
    pub fn new(id: String, name: String, thumb: String, created_at: DateTime<Utc>) -> Self {
        GalleryEntry {
            id,
            name,
            thumb,
            date: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Full-resolution image record, keyed by the gallery entry id.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: String,
    pub base64: String,
    pub mime: String,
}

/// `portrait_<unix-millis>`. Two saves in the same millisecond would share an
/// id, so the pipeline moves to the next free millisecond via `ImageStore::contains`.
pub fn portrait_id(millis: i64) -> String {
    format!("portrait_{millis}")
}
