//! Builder for configuring resolver instances

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::ImageResolver;
use crate::limiter::{DEFAULT_REQUESTS_PER_HOUR, DEFAULT_WINDOW, RateLimiter};
use crate::normalize::{DEFAULT_DESCRIPTORS, DEFAULT_QUERY_MAPPINGS, Normalizer, QueryBuilder};
use crate::providers::ImageSearchProvider;
use crate::store::ImageStore;
use crate::{LarderError, Result};

/// Default bound on a single upstream search.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for configuring [`ImageResolver`] instances.
///
/// ```rust
/// # use std::sync::Arc;
/// # use larder::{ImageResolver, MemoryStore};
/// let resolver = ImageResolver::builder()
///     .store(Arc::new(MemoryStore::new()))
///     .requests_per_hour(10)
///     .build()
///     .unwrap();
/// assert!(!resolver.has_provider());
/// ```
pub struct ResolverBuilder {
    store: Option<Arc<dyn ImageStore>>,
    provider: Option<Arc<dyn ImageSearchProvider>>,
    limiter: Option<Arc<RateLimiter>>,
    requests_per_hour: u32,
    rate_window: Duration,
    upstream_timeout: Duration,
    max_concurrent_lookups: usize,
    descriptors: Option<Vec<String>>,
    query_mappings: Option<Vec<(String, String)>>,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            provider: None,
            limiter: None,
            requests_per_hour: DEFAULT_REQUESTS_PER_HOUR,
            rate_window: DEFAULT_WINDOW,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            max_concurrent_lookups: 1,
            descriptors: None,
            query_mappings: None,
        }
    }

    /// Set the image cache store (required).
    pub fn store(mut self, store: Arc<dyn ImageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the image search provider.
    ///
    /// Without one, every cache miss resolves to a placeholder.
    pub fn provider(mut self, provider: Arc<dyn ImageSearchProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Configure the Unsplash provider with an access key.
    ///
    /// A blank key counts as no credential: no provider is attached.
    #[cfg(feature = "unsplash")]
    pub fn unsplash(self, access_key: impl Into<String>) -> Self {
        let access_key = access_key.into();
        if access_key.trim().is_empty() {
            return self;
        }
        self.provider(Arc::new(crate::providers::UnsplashClient::new(access_key)))
    }

    /// Share an existing rate limiter (e.g. between resolvers, or a test
    /// limiter). Overrides `requests_per_hour` and `rate_window`.
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Upstream searches allowed per window (default: 50).
    pub fn requests_per_hour(mut self, n: u32) -> Self {
        self.requests_per_hour = n;
        self
    }

    /// Length of the budget window (default: 1 hour).
    pub fn rate_window(mut self, window: Duration) -> Self {
        self.rate_window = window;
        self
    }

    /// Bound on a single upstream search (default: 10s). A search that
    /// takes longer resolves to a placeholder.
    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Upstream searches in flight at once during a batch (default: 1).
    pub fn max_concurrent_lookups(mut self, n: usize) -> Self {
        self.max_concurrent_lookups = n.max(1);
        self
    }

    /// Replace the descriptor table used for normalization.
    pub fn descriptors<S: AsRef<str>>(mut self, descriptors: &[S]) -> Self {
        self.descriptors = Some(descriptors.iter().map(|d| d.as_ref().to_string()).collect());
        self
    }

    /// Replace the ordered search phrase table.
    pub fn query_mappings<K: AsRef<str>, V: AsRef<str>>(mut self, mappings: &[(K, V)]) -> Self {
        self.query_mappings = Some(
            mappings
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
                .collect(),
        );
        self
    }

    /// Build the resolver.
    pub fn build(self) -> Result<ImageResolver> {
        let store = self.store.ok_or_else(|| {
            LarderError::Configuration("no image store configured".to_string())
        })?;

        if self.provider.is_none() {
            warn!("no image search provider configured; ingredient images will be placeholders");
        }

        let normalizer = match &self.descriptors {
            Some(descriptors) => Normalizer::new(descriptors.as_slice()),
            None => Normalizer::new(DEFAULT_DESCRIPTORS),
        };
        let queries = match &self.query_mappings {
            Some(mappings) => QueryBuilder::new(normalizer, mappings.as_slice()),
            None => QueryBuilder::new(normalizer, DEFAULT_QUERY_MAPPINGS),
        };

        let limiter = self.limiter.unwrap_or_else(|| {
            Arc::new(RateLimiter::with_window(
                self.requests_per_hour,
                self.rate_window,
            ))
        });

        Ok(ImageResolver::new(
            store,
            self.provider,
            limiter,
            queries,
            self.upstream_timeout,
            self.max_concurrent_lookups,
        ))
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn build_requires_store() {
        let err = ResolverBuilder::new().build().err().unwrap();
        assert!(matches!(err, LarderError::Configuration(_)));
    }

    #[tokio::test]
    async fn defaults() {
        let resolver = ResolverBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .build()
            .unwrap();
        assert_eq!(resolver.rate_limiter().budget(), 50);
        assert_eq!(resolver.rate_limiter().window(), Duration::from_secs(3600));
        assert!(!resolver.has_provider());
    }

    #[tokio::test]
    async fn custom_tables_are_used() {
        let resolver = ResolverBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .descriptors(&["smoked"])
            .query_mappings(&[("paprika", "smoked paprika powder")])
            .build()
            .unwrap();
        assert_eq!(resolver.normalize("Smoked Paprika"), "paprika");
        assert_eq!(resolver.search_query("smoked paprika"), "smoked paprika powder");
        assert_eq!(resolver.search_query("garlic"), "garlic food ingredient");
    }

    #[tokio::test]
    async fn shared_limiter_overrides_budget() {
        let limiter = Arc::new(RateLimiter::new(2));
        let resolver = ResolverBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .requests_per_hour(99)
            .rate_limiter(limiter.clone())
            .build()
            .unwrap();
        assert_eq!(resolver.rate_limiter().budget(), 2);
        assert!(limiter.try_consume());
        assert_eq!(resolver.rate_limiter().remaining(), 1);
    }
}
