use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::ForgeError;
use crate::gallery::models::StoredImage;

/// Full-resolution portraits in SQLite, keyed by gallery entry id.
#[derive(Clone)]
pub struct ImageStore {
    pool: SqlitePool,
}

impl ImageStore {
    pub async fn open(database_url: &str) -> Result<Self, ForgeError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS images (\
                id TEXT PRIMARY KEY NOT NULL,\
                base64 TEXT NOT NULL,\
                mime TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        info!("Image store ready");
        Ok(ImageStore { pool })
    }

    /// Inserts or replaces the record for `id`.
    pub async fn put(&self, id: &str, base64: &str, mime: &str) -> Result<(), ForgeError> {
        sqlx::query(
            "INSERT INTO images (id, base64, mime) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET base64 = excluded.base64, mime = excluded.mime",
        )
        .bind(id)
        .bind(base64)
        .bind(mime)
        .execute(&self.pool)
        .await?;
        debug!(id, mime, bytes = base64.len(), "Stored portrait image");
        Ok(())
    }

    /// Returns `Ok(None)` when no image is stored under `id`.
    pub async fn get(&self, id: &str) -> Result<Option<StoredImage>, ForgeError> {
        let row = sqlx::query_as::<_, StoredImage>(
            "SELECT id, base64, mime FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn contains(&self, id: &str) -> Result<bool, ForgeError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM images WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ForgeError> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, ForgeError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, ImageStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("gallery.db").display());
        let store = ImageStore::open(&url).await.expect("open store");
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get_returns_what_was_stored() {
        let (_dir, store) = open_temp().await;
        store
            .put("portrait_1", "ZmFrZS1wbmc=", "image/png")
            .await
            .expect("put");

        let image = store.get("portrait_1").await.expect("get").expect("present");
        assert_eq!(image.base64, "ZmFrZS1wbmc=");
        assert_eq!(image.mime, "image/png");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_rather_than_an_error() {
        let (_dir, store) = open_temp().await;
        assert_eq!(store.get("portrait_missing").await.expect("get"), None);
    }

    #[tokio::test]
    async fn put_upserts_and_delete_removes() {
        let (_dir, store) = open_temp().await;
        store.put("portrait_1", "AAAA", "image/png").await.expect("put");
        store.put("portrait_1", "BBBB", "image/jpeg").await.expect("upsert");
        assert_eq!(store.count().await.expect("count"), 1);

        let image = store.get("portrait_1").await.expect("get").expect("present");
        assert_eq!(image.mime, "image/jpeg");

        assert!(store.contains("portrait_1").await.expect("contains"));
        assert!(store.delete("portrait_1").await.expect("delete"));
        assert!(!store.contains("portrait_1").await.expect("contains"));
        assert!(!store.delete("portrait_1").await.expect("delete again"));
        assert_eq!(store.count().await.expect("count"), 0);
    }
}
