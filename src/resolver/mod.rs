//! Ingredient image resolution.
//!
//! [`ImageResolver`] answers "which photo goes with this ingredient?" while
//! spending as little of the upstream search budget as possible.
//!
//! # Lookup path
//!
//! 1. Normalize the raw name into a cache key.
//! 2. A valid stored row (upstream source, non-empty URL) is a hit and
//!    costs no upstream call.
//! 3. Any other stored row is stale and is deleted before going upstream.
//! 4. Without a provider, with the hourly budget spent, or when the
//!    search fails, times out or finds nothing, the result is a
//!    placeholder. Placeholders are never stored, so the next miss
//!    retries.
//! 5. Otherwise the top candidate is upserted and returned.
//!
//! Only store failures are errors; every upstream problem degrades to a
//! placeholder.
//!
//! # Batches
//!
//! [`ImageResolver::resolve_many`] reads every distinct key in one
//! `get_many` round trip, looks each missing key up upstream at most once
//! (up to `max_concurrent_lookups` at a time, consulting the rate limiter
//! per attempt), and reassembles results in input order. Outcome metrics
//! count distinct keys, with all empty names sharing one key.

mod builder;

pub use builder::{DEFAULT_UPSTREAM_TIMEOUT, ResolverBuilder};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::limiter::RateLimiter;
use crate::normalize::QueryBuilder;
use crate::providers::{ImageSearchProvider, SearchResponse};
use crate::store::ImageStore;
use crate::telemetry;
use crate::types::{
    Attribution, BatchResolution, CachedImage, IngredientInput, ResolvedImage, ResolvedIngredient,
    missing_image_warning,
};
use crate::{LarderError, Result};

/// Why a resolution ended with a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderReason {
    EmptyName,
    NoProvider,
    RateLimited,
    UpstreamError,
    NoResults,
}

impl PlaceholderReason {
    fn as_str(self) -> &'static str {
        match self {
            PlaceholderReason::EmptyName => "empty_name",
            PlaceholderReason::NoProvider => "no_provider",
            PlaceholderReason::RateLimited => "rate_limited",
            PlaceholderReason::UpstreamError => "upstream_error",
            PlaceholderReason::NoResults => "no_results",
        }
    }
}

/// Resolves ingredient names to photos through the cache and the search
/// provider.
///
/// Cheap to share: wrap in an `Arc` and call from concurrent requests.
/// The rate limiter may itself be shared between resolvers.
pub struct ImageResolver {
    store: Arc<dyn ImageStore>,
    provider: Option<Arc<dyn ImageSearchProvider>>,
    limiter: Arc<RateLimiter>,
    queries: QueryBuilder,
    upstream_timeout: Duration,
    max_concurrent_lookups: usize,
}

impl ImageResolver {
    /// Create a new builder for configuring the resolver.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    pub(crate) fn new(
        store: Arc<dyn ImageStore>,
        provider: Option<Arc<dyn ImageSearchProvider>>,
        limiter: Arc<RateLimiter>,
        queries: QueryBuilder,
        upstream_timeout: Duration,
        max_concurrent_lookups: usize,
    ) -> Self {
        Self {
            store,
            provider,
            limiter,
            queries,
            upstream_timeout,
            max_concurrent_lookups: max_concurrent_lookups.max(1),
        }
    }

    /// Cache key for a raw ingredient name.
    pub fn normalize(&self, raw_name: &str) -> String {
        self.queries.normalizer().normalize(raw_name)
    }

    /// Upstream search phrase for a raw ingredient name.
    pub fn search_query(&self, raw_name: &str) -> String {
        self.queries.build(raw_name)
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Whether an image search provider is configured.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolve the photo for a single ingredient.
    ///
    /// Only store failures are returned as errors.
    pub async fn resolve_one(&self, raw_name: &str) -> Result<ResolvedImage> {
        let key = self.normalize(raw_name);
        if key.is_empty() {
            return Ok(placeholder(PlaceholderReason::EmptyName));
        }

        match self.store.get(&key).await? {
            Some(row) if row.is_valid() => {
                record_hit(&key);
                return Ok(ResolvedImage::from(&row));
            }
            Some(_) => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                self.evict(&key).await?;
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
            }
        }

        self.fetch_and_cache(&key).await
    }

    /// Resolve photos for a recipe's ingredient list.
    ///
    /// `ingredients[i]` of the result corresponds to `items[i]`. Every
    /// placeholder gets a `Could not find image for "<name>"` warning.
    pub async fn resolve_many(&self, items: &[IngredientInput]) -> Result<BatchResolution> {
        let keys: Vec<String> = items.iter().map(|item| self.normalize(&item.name)).collect();

        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for key in &keys {
            if !key.is_empty() && seen.insert(key.as_str()) {
                distinct.push(key.clone());
            }
        }

        let cached = if distinct.is_empty() {
            HashMap::new()
        } else {
            self.store.get_many(&distinct).await?
        };

        let mut outcomes: HashMap<String, ResolvedImage> = HashMap::with_capacity(distinct.len());
        let mut misses = Vec::new();
        for key in distinct {
            match cached.get(&key) {
                Some(row) if row.is_valid() => {
                    record_hit(&key);
                    outcomes.insert(key, ResolvedImage::from(row));
                }
                Some(_) => {
                    metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                    self.evict(&key).await?;
                    misses.push(key);
                }
                None => {
                    metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                    misses.push(key);
                }
            }
        }

        if !misses.is_empty() {
            debug!(
                misses = misses.len(),
                concurrency = self.max_concurrent_lookups,
                "resolving cache misses upstream"
            );
            let fetched: Vec<ResolvedImage> = stream::iter(misses.iter())
                .map(|key| self.fetch_and_cache(key))
                .buffered(self.max_concurrent_lookups)
                .try_collect()
                .await?;
            outcomes.extend(misses.into_iter().zip(fetched));
        }

        // Empty names share one outcome, like any other key
        if keys.iter().any(|key| key.is_empty()) {
            outcomes.insert(String::new(), placeholder(PlaceholderReason::EmptyName));
        }

        let mut resolution = BatchResolution {
            ingredients: Vec::with_capacity(items.len()),
            warnings: Vec::new(),
        };
        for (item, key) in items.iter().zip(&keys) {
            let image = outcomes
                .get(key)
                .cloned()
                .unwrap_or_else(ResolvedImage::placeholder);
            if image.is_placeholder() {
                resolution.warnings.push(missing_image_warning(&item.name));
            }
            resolution
                .ingredients
                .push(ResolvedIngredient::new(item, image));
        }

        Ok(resolution)
    }

    /// Delete every cached image, returning how many were removed.
    pub async fn clear_cache(&self) -> Result<u64> {
        let cleared = self.store.delete_all().await?;
        info!(cleared, "cleared ingredient image cache");
        Ok(cleared)
    }

    /// Drop a stale row so the next lookup goes upstream.
    async fn evict(&self, key: &str) -> Result<()> {
        debug!(key, "evicting stale cached image");
        self.store.delete(key).await?;
        metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(1);
        Ok(())
    }

    /// Search upstream for `key` and persist the top candidate.
    async fn fetch_and_cache(&self, key: &str) -> Result<ResolvedImage> {
        let Some(provider) = &self.provider else {
            // Already warned once at build time
            return Ok(placeholder(PlaceholderReason::NoProvider));
        };

        if !self.limiter.try_consume() {
            warn!(key, budget = self.limiter.budget(), "image search budget exhausted");
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
            return Ok(placeholder(PlaceholderReason::RateLimited));
        }

        let query = self.queries.for_normalized(key);
        debug!(key, query = %query, provider = provider.name(), "searching for ingredient image");

        let start = Instant::now();
        let search = tokio::time::timeout(self.upstream_timeout, provider.search(&query));
        let outcome = match search.await {
            Ok(outcome) => outcome,
            Err(_) => Err(LarderError::Timeout(self.upstream_timeout)),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                record_upstream(provider.name(), start, "error");
                warn!(key, query = %query, error = %e, "image search failed");
                return Ok(placeholder(PlaceholderReason::UpstreamError));
            }
        };

        let Some(row) = top_candidate_row(key, &response, provider.as_ref()) else {
            record_upstream(provider.name(), start, "empty");
            debug!(key, query = %query, "no image search results");
            return Ok(placeholder(PlaceholderReason::NoResults));
        };
        record_upstream(provider.name(), start, "ok");

        let stored = self.store.upsert(row).await?;
        Ok(ResolvedImage::from(&stored))
    }
}

/// Build the cache row for the best candidate, if there is a usable one.
fn top_candidate_row(
    key: &str,
    response: &SearchResponse,
    provider: &dyn ImageSearchProvider,
) -> Option<CachedImage> {
    let best = response.best().filter(|c| !c.preview_url.is_empty())?;
    let attribution = Attribution::new(
        format!(
            "Photo by {} on {}",
            best.uploader_name,
            provider.display_name()
        ),
        format!(
            "{}{}",
            best.uploader_profile_url,
            provider.profile_link_suffix()
        ),
    );
    Some(CachedImage::upstream(key, &best.preview_url, attribution))
}

fn placeholder(reason: PlaceholderReason) -> ResolvedImage {
    metrics::counter!(telemetry::PLACEHOLDERS_TOTAL, "reason" => reason.as_str()).increment(1);
    ResolvedImage::placeholder()
}

fn record_hit(key: &str) {
    debug!(key, "image cache hit");
    metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
}

/// Record upstream outcome metrics (counter + histogram).
fn record_upstream(provider: &str, start: Instant, status: &'static str) {
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(telemetry::UPSTREAM_REQUESTS_TOTAL,
        "provider" => provider.to_owned(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::UPSTREAM_REQUEST_DURATION_SECONDS,
        "provider" => provider.to_owned(),
    )
    .record(elapsed);
}
