//! Image search provider trait.
//!
//! The resolver depends only on [`ImageSearchProvider`]; the concrete
//! Unsplash adapter lives behind the `unsplash` feature and tests plug in
//! fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One ranked photo candidate returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCandidate {
    /// Display-sized image URL.
    pub preview_url: String,
    pub uploader_name: String,
    /// The uploader's public profile page, without tracking parameters.
    pub uploader_profile_url: String,
}

/// Search results, best match first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<PhotoCandidate>,
    pub total_count: u64,
}

impl SearchResponse {
    /// The top-ranked candidate, if any.
    pub fn best(&self) -> Option<&PhotoCandidate> {
        self.results.first()
    }
}

/// Upstream photo search.
///
/// Errors cover transport failures, non-success statuses and malformed
/// payloads; zero results is a successful, empty response.
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    /// Provider name for logging/metrics (e.g. `"unsplash"`).
    fn name(&self) -> &str;

    /// Name used in attributions (e.g. `"Unsplash"`).
    fn display_name(&self) -> &str;

    /// Suffix appended to uploader profile links (e.g. referral tracking).
    fn profile_link_suffix(&self) -> String {
        String::new()
    }

    /// Search for photos matching `query`.
    async fn search(&self, query: &str) -> Result<SearchResponse>;
}
