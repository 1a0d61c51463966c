//! Cached image rows and single-ingredient resolution results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attribution shown when no photo could be found.
pub const PLACEHOLDER_ATTRIBUTION_TEXT: &str = "No image available";

/// Link used by placeholder attributions.
pub const PLACEHOLDER_ATTRIBUTION_LINK: &str = "#";

/// Where an ingredient photo came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Found through the image search provider.
    Upstream,
    /// Nothing found; the UI shows a "no image" tile.
    #[default]
    Placeholder,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Upstream => "upstream",
            ImageSource::Placeholder => "placeholder",
        }
    }
}

/// Photo provenance, rendered as a credit link next to the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub text: String,
    pub link: String,
}

impl Attribution {
    pub fn new(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: link.into(),
        }
    }

    /// The "No image available" attribution.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_ATTRIBUTION_TEXT, PLACEHOLDER_ATTRIBUTION_LINK)
    }
}

/// One row of the ingredient image cache, keyed by normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedImage {
    pub normalized_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub attribution_text: String,
    #[serde(default)]
    pub attribution_link: String,
    #[serde(default)]
    pub source: ImageSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CachedImage {
    /// Build a fresh upstream-sourced row with both timestamps set to now.
    pub fn upstream(
        normalized_name: impl Into<String>,
        image_url: impl Into<String>,
        attribution: Attribution,
    ) -> Self {
        let now = Utc::now();
        Self {
            normalized_name: normalized_name.into(),
            image_url: image_url.into(),
            attribution_text: attribution.text,
            attribution_link: attribution.link,
            source: ImageSource::Upstream,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this row may be served as a cache hit.
    ///
    /// Only upstream rows with an image URL qualify; anything else is
    /// stale and gets evicted before a fresh lookup.
    pub fn is_valid(&self) -> bool {
        self.source == ImageSource::Upstream && !self.image_url.is_empty()
    }

    pub fn attribution(&self) -> Attribution {
        Attribution::new(&self.attribution_text, &self.attribution_link)
    }
}

/// Outcome of resolving a single ingredient name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedImage {
    pub image_url: String,
    pub attribution: Attribution,
    pub source: ImageSource,
}

impl ResolvedImage {
    /// Empty image with the "No image available" credit.
    pub fn placeholder() -> Self {
        Self {
            image_url: String::new(),
            attribution: Attribution::placeholder(),
            source: ImageSource::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == ImageSource::Placeholder
    }
}

impl From<&CachedImage> for ResolvedImage {
    fn from(cached: &CachedImage) -> Self {
        Self {
            image_url: cached.image_url.clone(),
            attribution: cached.attribution(),
            source: cached.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source: ImageSource, url: &str) -> CachedImage {
        CachedImage {
            source,
            image_url: url.to_string(),
            ..CachedImage::upstream("garlic", "", Attribution::placeholder())
        }
    }

    #[test]
    fn upstream_row_with_url_is_valid() {
        assert!(row(ImageSource::Upstream, "https://images.example/garlic.jpg").is_valid());
    }

    #[test]
    fn placeholder_row_is_invalid() {
        assert!(!row(ImageSource::Placeholder, "https://images.example/garlic.jpg").is_valid());
    }

    #[test]
    fn upstream_row_without_url_is_invalid() {
        assert!(!row(ImageSource::Upstream, "").is_valid());
    }

    #[test]
    fn placeholder_resolution_shape() {
        let resolved = ResolvedImage::placeholder();
        assert!(resolved.is_placeholder());
        assert_eq!(resolved.image_url, "");
        assert_eq!(resolved.attribution.text, "No image available");
        assert_eq!(resolved.attribution.link, "#");
    }

    #[test]
    fn cached_image_serializes_camel_case() {
        let json = serde_json::to_value(row(ImageSource::Upstream, "u")).unwrap();
        assert_eq!(json["normalizedName"], "garlic");
        assert_eq!(json["source"], "upstream");
        assert!(json.get("updatedAt").is_some());
    }
}
