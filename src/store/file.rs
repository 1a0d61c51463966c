//! Durable image table backed by a JSON document.
//!
//! On-disk format:
//!
//! ```json
//! { "version": 1, "images": [ { "normalizedName": "garlic", ... } ] }
//! ```
//!
//! A bare array of rows is also accepted when loading. The whole table
//! is held in memory and rewritten atomically (tmp file + rename) after
//! every mutation; mutations are serialised by one async mutex.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{ImageStore, merge_upsert, validate_row};
use crate::types::CachedImage;
use crate::{LarderError, Result};

/// Maximum supported store format version.
const MAX_SUPPORTED_VERSION: u32 = 1;

/// Default store path: `~/.cache/larder/ingredient_images.json`.
pub fn default_store_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("larder")
        .join("ingredient_images.json")
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    version: u32,
    images: Vec<&'a CachedImage>,
}

#[derive(Deserialize)]
struct StoreDocument {
    version: u32,
    images: Vec<CachedImage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Versioned(StoreDocument),
    Bare(Vec<CachedImage>),
}

fn parse_document(json: &str) -> Result<Vec<CachedImage>> {
    let document: RawDocument = serde_json::from_str(json)
        .map_err(|e| LarderError::Store(format!("failed to parse image store: {e}")))?;
    match document {
        RawDocument::Versioned(doc) => {
            if doc.version > MAX_SUPPORTED_VERSION {
                return Err(LarderError::Store(format!(
                    "unsupported image store version {} (max supported: {MAX_SUPPORTED_VERSION})",
                    doc.version
                )));
            }
            Ok(doc.images)
        }
        RawDocument::Bare(images) => Ok(images),
    }
}

/// Image table persisted to a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    rows: Mutex<HashMap<String, CachedImage>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing rows.
    ///
    /// A missing file starts an empty table. A corrupt or unsupported
    /// file is logged and also starts empty; it is replaced on the next
    /// write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rows = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match parse_document(&content) {
                Ok(images) => {
                    info!(path = %path.display(), count = images.len(), "loaded image store");
                    images
                        .into_iter()
                        .filter(|row| !row.normalized_name.trim().is_empty())
                        .map(|row| (row.normalized_name.clone(), row))
                        .collect()
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "corrupt image store, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no image store yet");
                HashMap::new()
            }
            Err(e) => {
                return Err(LarderError::Store(format!(
                    "failed to read image store {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    /// Open the store at [`default_store_path()`].
    pub async fn open_default() -> Result<Self> {
        Self::open(default_store_path()).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table to disk (atomic write via tmp + rename).
    async fn persist(&self, rows: &HashMap<String, CachedImage>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    LarderError::Store(format!(
                        "failed to create store dir {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        // Sorted so the file diffs cleanly between writes
        let mut images: Vec<&CachedImage> = rows.values().collect();
        images.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        let json = serde_json::to_string_pretty(&StoreDocumentRef {
            version: MAX_SUPPORTED_VERSION,
            images,
        })
        .map_err(|e| LarderError::Store(format!("failed to serialize image store: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            LarderError::Store(format!(
                "failed to write store file {}: {e}",
                tmp_path.display()
            ))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            LarderError::Store(format!(
                "failed to rename store file {} → {}: {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl ImageStore for JsonFileStore {
    async fn get(&self, normalized_name: &str) -> Result<Option<CachedImage>> {
        Ok(self.rows.lock().await.get(normalized_name).cloned())
    }

    async fn get_many(&self, normalized_names: &[String]) -> Result<HashMap<String, CachedImage>> {
        let rows = self.rows.lock().await;
        Ok(normalized_names
            .iter()
            .filter_map(|name| rows.get(name).map(|row| (name.clone(), row.clone())))
            .collect())
    }

    async fn upsert(&self, image: CachedImage) -> Result<CachedImage> {
        validate_row(&image)?;
        let mut rows = self.rows.lock().await;
        let merged = merge_upsert(rows.get(&image.normalized_name), image);

        let previous = rows.insert(merged.normalized_name.clone(), merged.clone());
        if let Err(e) = self.persist(&rows).await {
            // keep memory consistent with disk
            match previous {
                Some(previous) => rows.insert(previous.normalized_name.clone(), previous),
                None => rows.remove(&merged.normalized_name),
            };
            return Err(e);
        }
        Ok(merged)
    }

    async fn delete(&self, normalized_name: &str) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if let Some(previous) = rows.remove(normalized_name) {
            if let Err(e) = self.persist(&rows).await {
                rows.insert(previous.normalized_name.clone(), previous);
                return Err(e);
            }
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut rows = self.rows.lock().await;
        let count = rows.len() as u64;
        let previous = std::mem::take(&mut *rows);
        if let Err(e) = self.persist(&rows).await {
            *rows = previous;
            return Err(e);
        }
        info!(count, path = %self.path.display(), "cleared image store");
        Ok(count)
    }
}
