use std::path::Path;
use std::sync::Arc;

use crate::error::ForgeError;

pub mod images;
pub mod index;
pub mod kv;
pub mod models;
pub mod thumbnail;

pub use images::ImageStore;
pub use index::{GalleryIndex, GALLERY_CAPACITY, GALLERY_KEY};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use models::{portrait_id, GalleryEntry, StoredImage};
pub use thumbnail::create_thumbnail;

/// Both persistence surfaces: the listing/settings store and the image store.
///
/// They are written one after the other without a shared transaction, so a
/// crash in between can leave an image with no listing entry.
pub struct Gallery {
    pub settings: Arc<dyn KeyValueStore>,
    pub index: GalleryIndex,
    pub images: ImageStore,
}

impl Gallery {
    pub fn new(settings: Arc<dyn KeyValueStore>, images: ImageStore) -> Self {
        Self {
            index: GalleryIndex::new(settings.clone()),
            settings,
            images,
        }
    }

    pub async fn open(data_dir: &Path, database_url: &str) -> Result<Self, ForgeError> {
        std::fs::create_dir_all(data_dir).map_err(|err| {
            ForgeError::Persistence(format!(
                "Failed to create data directory {}: {err}",
                data_dir.display()
            ))
        })?;
        let images = ImageStore::open(database_url).await?;
        Ok(Self::new(Arc::new(FileKeyValueStore::new(data_dir)), images))
    }
}
