//! In-process image table.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ImageStore, merge_upsert, validate_row};
use crate::Result;
use crate::types::CachedImage;

/// Image table held in process memory.
///
/// Suitable for single-process deployments and as the store double in
/// tests. Every operation is atomic with respect to the others.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<String, CachedImage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of rows (later duplicates win).
    pub fn with_rows(rows: impl IntoIterator<Item = CachedImage>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| (row.normalized_name.clone(), row))
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Number of rows currently stored.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn get(&self, normalized_name: &str) -> Result<Option<CachedImage>> {
        Ok(self.rows.read().await.get(normalized_name).cloned())
    }

    async fn get_many(&self, normalized_names: &[String]) -> Result<HashMap<String, CachedImage>> {
        let rows = self.rows.read().await;
        Ok(normalized_names
            .iter()
            .filter_map(|name| rows.get(name).map(|row| (name.clone(), row.clone())))
            .collect())
    }

    async fn upsert(&self, image: CachedImage) -> Result<CachedImage> {
        validate_row(&image)?;
        let mut rows = self.rows.write().await;
        let merged = merge_upsert(rows.get(&image.normalized_name), image);
        rows.insert(merged.normalized_name.clone(), merged.clone());
        Ok(merged)
    }

    async fn delete(&self, normalized_name: &str) -> Result<()> {
        self.rows.write().await.remove(normalized_name);
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut rows = self.rows.write().await;
        let count = rows.len() as u64;
        rows.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LarderError;
    use crate::types::{Attribution, ImageSource};

    fn row(name: &str) -> CachedImage {
        CachedImage::upstream(
            name,
            format!("https://images.example/{name}.jpg"),
            Attribution::new("Photo by Ada on Unsplash", "https://unsplash.com/@ada"),
        )
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get("garlic").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_then_get() {
        let store = MemoryStore::new();
        store.upsert(row("garlic")).await.unwrap();
        let got = store.get("garlic").await.unwrap().unwrap();
        assert_eq!(got.image_url, "https://images.example/garlic.jpg");
        assert_eq!(got.source, ImageSource::Upstream);
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_and_created_at() {
        let store = MemoryStore::new();
        let first = store.upsert(row("garlic")).await.unwrap();

        let mut replacement = row("garlic");
        replacement.image_url = "https://images.example/other.jpg".into();
        let second = store.upsert(replacement).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(
            store.get("garlic").await.unwrap().unwrap().image_url,
            "https://images.example/other.jpg"
        );
    }

    #[tokio::test]
    async fn upsert_rejects_empty_key() {
        let store = MemoryStore::new();
        let err = store.upsert(row("  ")).await.unwrap_err();
        assert!(matches!(err, LarderError::InvalidInput(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn get_many_returns_only_hits() {
        let store = MemoryStore::with_rows([row("garlic"), row("onion")]);
        let hits = store
            .get_many(&["garlic".to_string(), "salt".to_string()])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits.contains_key("garlic"));
    }

    #[tokio::test]
    async fn delete_and_delete_all() {
        let store = MemoryStore::with_rows([row("garlic"), row("onion"), row("salt")]);
        store.delete("onion").await.unwrap();
        store.delete("not-there").await.unwrap();
        assert_eq!(store.len().await, 2);

        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.get("garlic").await.unwrap().is_none());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }
}
