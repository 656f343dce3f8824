use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ForgeError;
use crate::gallery::{
    create_thumbnail, portrait_id, Gallery, GalleryEntry, ImageStore, StoredImage,
};
use crate::llm::gemini::{GeminiClient, GenerationResult};
use crate::prompt::TraitSelection;

/// A portrait ready to be shown or exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portrait {
    pub name: String,
    pub image_base64: String,
    pub mime_type: String,
}

impl Portrait {
    pub fn from_result(name: &str, result: &GenerationResult) -> Self {
        Portrait {
            name: name.to_string(),
            image_base64: result.image_base64.clone(),
            mime_type: result.mime_type.clone(),
        }
    }

    fn from_stored(name: String, image: StoredImage) -> Self {
        Portrait {
            name,
            image_base64: image.base64,
            mime_type: image.mime,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedPortrait {
    pub entry: GalleryEntry,
    pub portrait: Portrait,
}

fn validate_input(selection: &TraitSelection, credential: &str) -> Result<(), ForgeError> {
    if credential.trim().is_empty() {
        return Err(ForgeError::Input(
            "Enter your Gemini API key first!".to_string(),
        ));
    }
    if selection.ruler_name.trim().is_empty() {
        return Err(ForgeError::Input("Your ruler needs a name!".to_string()));
    }
    Ok(())
}

/// First `portrait_<millis>` id at or after `created_at` with no stored image.
async fn unused_portrait_id(
    images: &ImageStore,
    created_at: DateTime<Utc>,
) -> Result<String, ForgeError> {
    let mut millis = created_at.timestamp_millis();
    loop {
        let id = portrait_id(millis);
        if !images.contains(&id).await? {
            return Ok(id);
        }
        millis += 1;
    }
}

/// Generates a portrait and saves it: image record first, then the listing entry.
pub async fn paint_portrait(
    client: &GeminiClient,
    gallery: &Gallery,
    selection: &TraitSelection,
    credential: &str,
    model: &str,
) -> Result<SavedPortrait, ForgeError> {
    validate_input(selection, credential)?;
    let name = selection.ruler_name.trim();

    let result = client
        .generate_portrait(selection, credential.trim(), model)
        .await?;

    let created_at = Utc::now();
    let id = unused_portrait_id(&gallery.images, created_at).await?;
    gallery
        .images
        .put(&id, &result.image_base64, &result.mime_type)
        .await?;

    let thumb = match result.decode_bytes().and_then(|bytes| create_thumbnail(&bytes)) {
        Ok(thumb) => thumb,
        Err(err) => {
            warn!(id = %id, "Saving portrait without a thumbnail: {err}");
            String::new()
        }
    };

    let entry = GalleryEntry::new(id, name.to_string(), thumb, created_at);
    gallery.index.append(entry.clone());
    info!(id = %entry.id, name = %entry.name, mime = %result.mime_type, "Portrait saved to gallery");

    Ok(SavedPortrait {
        portrait: Portrait::from_result(name, &result),
        entry,
    })
}

/// Loads the full image behind a gallery entry. `Ok(None)` when the image is gone.
pub async fn open_portrait(gallery: &Gallery, id: &str) -> Result<Option<Portrait>, ForgeError> {
    let Some(image) = gallery.images.get(id).await? else {
        return Ok(None);
    };
    let name = gallery
        .index
        .find(id)
        .map(|entry| entry.name)
        .unwrap_or_else(|| id.to_string());
    Ok(Some(Portrait::from_stored(name, image)))
}
