//! Persistent ingredient image cache.
//!
//! The resolver only talks to an [`ImageStore`]: an exact-match table
//! keyed by normalized ingredient name with at most one row per key.
//! Implementations must make `upsert` atomic per key; the resolver does
//! no locking of its own across processes.
//!
//! Two implementations ship:
//!
//! - [`MemoryStore`]: process-local table, also the test double.
//! - [`JsonFileStore`]: durable table in a versioned JSON document.

mod file;
mod memory;

pub use file::{JsonFileStore, default_store_path};
pub use memory::MemoryStore;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::CachedImage;
use crate::{LarderError, Result};

/// Capability interface for the ingredient image table.
///
/// All errors are reported as [`LarderError::Store`] (or `InvalidInput`
/// for rows violating the key invariant).
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Fetch one row by normalized name.
    async fn get(&self, normalized_name: &str) -> Result<Option<CachedImage>>;

    /// Fetch every row whose key is in `normalized_names` in one round
    /// trip. Absent keys are simply missing from the map.
    async fn get_many(&self, normalized_names: &[String]) -> Result<HashMap<String, CachedImage>>;

    /// Insert or update by `normalized_name`.
    ///
    /// An existing row keeps its `created_at`; `updated_at` is always
    /// refreshed. Returns the row as stored.
    async fn upsert(&self, image: CachedImage) -> Result<CachedImage>;

    /// Delete one row. Deleting a missing key is not an error.
    async fn delete(&self, normalized_name: &str) -> Result<()>;

    /// Delete every row, returning how many were removed.
    async fn delete_all(&self) -> Result<u64>;
}

/// Reject rows that would break the one-row-per-normalized-name key.
pub(crate) fn validate_row(image: &CachedImage) -> Result<()> {
    if image.normalized_name.trim().is_empty() {
        return Err(LarderError::InvalidInput(
            "cached image requires a non-empty normalized name".to_string(),
        ));
    }
    Ok(())
}

/// Merge an incoming row with the existing one for the same key.
pub(crate) fn merge_upsert(
    existing: Option<&CachedImage>,
    mut incoming: CachedImage,
) -> CachedImage {
    let now = chrono::Utc::now();
    if let Some(existing) = existing {
        incoming.created_at = existing.created_at;
    }
    incoming.updated_at = now;
    incoming
}
