use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::gallery::kv::KeyValueStore;
use crate::gallery::models::GalleryEntry;

pub const GALLERY_KEY: &str = "forge_gallery";
pub const GALLERY_CAPACITY: usize = 50;

/// Most-recent-first listing of saved portraits.
///
/// Storage failures never propagate: an unreadable listing, or one that is not a
/// JSON array, reads as empty. Array items without an `id` are skipped. A failed
/// write is logged and dropped. Writes inside one process
/// go through `write_lock` so concurrent appends cannot lose each other.
pub struct GalleryIndex {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl GalleryIndex {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn list(&self) -> Vec<GalleryEntry> {
        let raw = match self.store.get(GALLERY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("Failed to read gallery listing: {err}");
                return Vec::new();
            }
        };

        let values = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn!("Gallery listing is corrupt, treating it as empty: {err}");
                return Vec::new();
            }
        };

        let total = values.len();
        let entries: Vec<GalleryEntry> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        if entries.len() < total {
            warn!(
                skipped = total - entries.len(),
                "Skipping unreadable gallery entries"
            );
        }
        entries
    }

    pub fn find(&self, id: &str) -> Option<GalleryEntry> {
        self.list().into_iter().find(|entry| entry.id == id)
    }

    /// Prepends `entry`, dropping the oldest entries beyond the capacity.
    pub fn append(&self, entry: GalleryEntry) {
        let _guard = self.write_lock.lock();
        let mut entries = self.list();
        entries.insert(0, entry);
        entries.truncate(GALLERY_CAPACITY);
        self.save(&entries);
    }

    /// Removes the entry with `id`, returning whether one was present.
    pub fn remove(&self, id: &str) -> bool {
        let _guard = self.write_lock.lock();
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return false;
        }
        self.save(&entries);
        true
    }

    fn save(&self, entries: &[GalleryEntry]) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Failed to encode gallery listing: {err}");
                return;
            }
        };
        match self.store.set(GALLERY_KEY, &raw) {
            Ok(()) => debug!(entries = entries.len(), "Gallery listing saved"),
            Err(err) => warn!("Failed to save gallery listing: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::kv::MemoryKeyValueStore;

    fn entry(n: usize) -> GalleryEntry {
        GalleryEntry {
            id: format!("portrait_{n}"),
            name: format!("Ruler {n}"),
            thumb: String::new(),
            date: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn index_with(store: Arc<MemoryKeyValueStore>) -> GalleryIndex {
        GalleryIndex::new(store)
    }

    #[test]
    fn appending_past_capacity_keeps_most_recent_fifty() {
        let index = index_with(Arc::new(MemoryKeyValueStore::new()));
        for n in 0..=GALLERY_CAPACITY {
            index.append(entry(n));
        }

        let entries = index.list();
        assert_eq!(entries.len(), GALLERY_CAPACITY);
        assert_eq!(entries[0].id, "portrait_50");
        assert_eq!(entries[GALLERY_CAPACITY - 1].id, "portrait_1");
        assert!(index.find("portrait_0").is_none());
    }

    #[test]
    fn missing_or_corrupt_listing_reads_as_empty() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let index = index_with(store.clone());
        assert!(index.list().is_empty());

        store.set(GALLERY_KEY, "{not json").expect("set");
        assert!(index.list().is_empty());

        index.append(entry(1));
        assert_eq!(index.list(), vec![entry(1)]);
    }

    #[test]
    fn one_malformed_entry_does_not_hide_the_rest() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut raw: Vec<Value> = (0..10)
            .map(|n| serde_json::to_value(entry(n)).expect("value"))
            .collect();
        raw.push(serde_json::json!({ "id": "portrait_10", "name": "No thumb" }));
        raw.push(serde_json::json!({ "name": "No id" }));
        raw.push(serde_json::json!(42));
        store
            .set(GALLERY_KEY, &serde_json::to_string(&raw).expect("json"))
            .expect("set");
        let index = index_with(store);

        let entries = index.list();
        assert_eq!(entries.len(), 11);
        assert_eq!(entries[10].id, "portrait_10");
        assert!(entries[10].thumb.is_empty());

        index.append(entry(11));
        let entries = index.list();
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0].id, "portrait_11");
        assert!(index.find("portrait_0").is_some());
    }

    #[test]
    fn concurrent_appends_keep_every_entry() {
        let index = Arc::new(index_with(Arc::new(MemoryKeyValueStore::new())));
        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for n in 0..5 {
                        index.append(entry(thread * 5 + n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("append thread");
        }

        let mut ids: Vec<String> = index.list().into_iter().map(|entry| entry.id).collect();
        assert_eq!(ids.len(), 40);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 40);
    }

    #[test]
    fn concurrent_appends_past_capacity_stay_capped() {
        let index = Arc::new(index_with(Arc::new(MemoryKeyValueStore::new())));
        let handles: Vec<_> = (0..4)
            .map(|thread| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for n in 0..20 {
                        index.append(entry(thread * 20 + n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("append thread");
        }

        assert_eq!(index.list().len(), GALLERY_CAPACITY);
    }

    #[test]
    fn remove_drops_only_the_matching_entry() {
        let index = index_with(Arc::new(MemoryKeyValueStore::new()));
        index.append(entry(1));
        index.append(entry(2));

        assert!(index.remove("portrait_1"));
        assert!(!index.remove("portrait_1"));
        assert_eq!(index.list(), vec![entry(2)]);
    }
}
