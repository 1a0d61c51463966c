//! Unsplash photo search client.
//!
//! See: <https://unsplash.com/documentation#search-photos>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::traits::{ImageSearchProvider, PhotoCandidate, SearchResponse};
use crate::{LarderError, Result};

/// Default base URL for the Unsplash API
const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Default number of candidates requested per search.
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Default `content_filter` (Unsplash's strictest).
pub const DEFAULT_CONTENT_FILTER: &str = "high";

/// Default `utm_source` for attribution links.
pub const DEFAULT_REFERRAL_SOURCE: &str = "larder";

/// Client for the Unsplash search API.
///
/// Authenticates with a `Client-ID` access key. Unsplash's API guidelines
/// require credit links to carry `utm_source`/`utm_medium` parameters,
/// exposed through [`ImageSearchProvider::profile_link_suffix`].
#[derive(Clone)]
pub struct UnsplashClient {
    access_key: String,
    http: Client,
    base_url: String,
    per_page: u32,
    content_filter: String,
    referral_source: String,
}

impl UnsplashClient {
    /// Create a new Unsplash client with the given access key.
    pub fn new(access_key: impl Into<String>) -> Self {
        Self::with_base_url(access_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(access_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            http: build_http(Duration::from_secs(10)),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            per_page: DEFAULT_PER_PAGE,
            content_filter: DEFAULT_CONTENT_FILTER.to_string(),
            referral_source: DEFAULT_REFERRAL_SOURCE.to_string(),
        }
    }

    /// Number of candidates to request (1–30 per Unsplash limits).
    pub fn per_page(mut self, n: u32) -> Self {
        self.per_page = n.clamp(1, 30);
        self
    }

    /// Set the `content_filter` parameter (`low` or `high`).
    pub fn content_filter(mut self, filter: impl Into<String>) -> Self {
        self.content_filter = filter.into();
        self
    }

    /// Set the `utm_source` used in attribution links.
    pub fn referral_source(mut self, source: impl Into<String>) -> Self {
        self.referral_source = source.into();
        self
    }

    /// Set the HTTP timeout for each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http = build_http(timeout);
        self
    }

    /// Search photos for `query`.
    pub async fn search_photos(&self, query: &str) -> Result<SearchResponse> {
        let url = format!("{}/search/photos", self.base_url);
        let per_page = self.per_page.to_string();

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("content_filter", self.content_filter.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LarderError::Http(e.to_string()))?;

        self.handle_response_errors(&response)?;

        let text = response
            .text()
            .await
            .map_err(|e| LarderError::Http(e.to_string()))?;
        let body: UnsplashSearchBody = serde_json::from_str(&text)?;

        Ok(SearchResponse {
            total_count: body.total,
            results: body
                .results
                .into_iter()
                .map(|photo| PhotoCandidate {
                    preview_url: photo.urls.small,
                    uploader_name: photo.user.name,
                    uploader_profile_url: photo.user.links.html,
                })
                .collect(),
        })
    }

    /// Check response status and map to appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 => Err(LarderError::AuthenticationFailed),
            // Unsplash answers 403 "Rate Limit Exceeded" once the hourly
            // quota is gone
            403 | 429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(LarderError::RateLimited { retry_after })
            }
            code => Err(LarderError::Api {
                status: code,
                message: format!("Unsplash API error: {}", status),
            }),
        }
    }
}

fn build_http(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .expect("failed to build HTTP client")
}

#[derive(Deserialize)]
struct UnsplashSearchBody {
    #[serde(default)]
    total: u64,
    results: Vec<UnsplashPhoto>,
}

#[derive(Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
    user: UnsplashUser,
}

#[derive(Deserialize)]
struct UnsplashUrls {
    small: String,
}

#[derive(Deserialize)]
struct UnsplashUser {
    name: String,
    links: UnsplashUserLinks,
}

#[derive(Deserialize)]
struct UnsplashUserLinks {
    html: String,
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl ImageSearchProvider for UnsplashClient {
    fn name(&self) -> &str {
        "unsplash"
    }

    fn display_name(&self) -> &str {
        "Unsplash"
    }

    fn profile_link_suffix(&self) -> String {
        format!("?utm_source={}&utm_medium=referral", self.referral_source)
    }

    async fn search(&self, query: &str) -> Result<SearchResponse> {
        UnsplashClient::search_photos(self, query).await
    }
}
