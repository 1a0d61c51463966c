//! Configuration loading for the larder CLI.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.larder/config.toml` (user)
//! 3. `/etc/larder/config.toml` (system)
//!
//! Built-in defaults apply when no file exists.
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.larder/secrets.toml` (user, must be 0600)
//! 2. `/etc/larder/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::limiter::DEFAULT_REQUESTS_PER_HOUR;
use crate::resolver::{DEFAULT_UPSTREAM_TIMEOUT, ResolverBuilder};
use crate::store::default_store_path;
use crate::{LarderError, Result};

/// Environment variable consulted when no secrets file holds the key.
pub const UNSPLASH_ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub unsplash: UnsplashConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Image cache location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Path of the JSON cache file (default: `{cache_dir}/larder/ingredient_images.json`).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_store_path)
    }
}

/// Unsplash request options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnsplashConfig {
    /// API base URL (default: https://api.unsplash.com).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Candidates per search (default: 5).
    #[serde(default)]
    pub per_page: Option<u32>,
    /// Content filter, "low" or "high" (default: "high").
    #[serde(default)]
    pub content_filter: Option<String>,
    /// `utm_source` for attribution links (default: "larder").
    #[serde(default)]
    pub referral_source: Option<String>,
}

/// Upstream usage limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Upstream searches per hour (default: 50).
    #[serde(default = "default_requests_per_hour")]
    pub requests_per_hour: u32,
    /// Upstream search timeout in seconds (default: 10).
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
    /// Concurrent upstream searches per batch (default: 1).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_lookups: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            requests_per_hour: default_requests_per_hour(),
            upstream_timeout_secs: default_upstream_timeout(),
            max_concurrent_lookups: default_max_concurrent(),
        }
    }
}

fn default_requests_per_hour() -> u32 {
    DEFAULT_REQUESTS_PER_HOUR
}

fn default_upstream_timeout() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT.as_secs()
}

fn default_max_concurrent() -> usize {
    1
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub unsplash: Option<AccessKeySecret>,
}

/// A single access key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessKeySecret {
    pub access_key: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided, must exist)
    /// 2. `~/.larder/config.toml`
    /// 3. `/etc/larder/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Config::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LarderError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            LarderError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, or `None` when no file exists.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(LarderError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".larder").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/larder/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply the configured limits and Unsplash options to a resolver builder.
    ///
    /// The provider is only attached when `access_key` is present; without
    /// one the resolver serves cached rows and placeholders.
    pub fn apply(&self, builder: ResolverBuilder, access_key: Option<String>) -> ResolverBuilder {
        let mut builder = builder
            .requests_per_hour(self.limits.requests_per_hour)
            .upstream_timeout(Duration::from_secs(self.limits.upstream_timeout_secs))
            .max_concurrent_lookups(self.limits.max_concurrent_lookups);

        #[cfg(feature = "unsplash")]
        if let Some(key) = access_key {
            builder = builder.provider(Arc::new(self.unsplash_client(key)));
        }
        #[cfg(not(feature = "unsplash"))]
        let _ = access_key;

        builder
    }

    #[cfg(feature = "unsplash")]
    fn unsplash_client(&self, access_key: String) -> crate::providers::UnsplashClient {
        use crate::providers::UnsplashClient;

        let unsplash = &self.unsplash;
        let mut client = match &unsplash.base_url {
            Some(url) => UnsplashClient::with_base_url(access_key, url.as_str()),
            None => UnsplashClient::new(access_key),
        };
        client = client.timeout(Duration::from_secs(self.limits.upstream_timeout_secs));
        if let Some(n) = unsplash.per_page {
            client = client.per_page(n);
        }
        if let Some(filter) = &unsplash.content_filter {
            client = client.content_filter(filter.as_str());
        }
        if let Some(source) = &unsplash.referral_source {
            client = client.referral_source(source.as_str());
        }
        client
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.larder/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/larder/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".larder").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/larder/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LarderError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            LarderError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    pub fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            LarderError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(LarderError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Unsplash access key, falling back to `UNSPLASH_ACCESS_KEY`.
    ///
    /// Blank keys count as missing.
    pub fn unsplash_access_key(&self) -> Option<String> {
        self.unsplash
            .as_ref()
            .map(|s| s.access_key.trim().to_string())
            .filter(|key| !key.is_empty())
            .or_else(|| {
                std::env::var(UNSPLASH_ACCESS_KEY_ENV)
                    .ok()
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.limits.requests_per_hour, 50);
        assert_eq!(config.limits.upstream_timeout_secs, 10);
        assert_eq!(config.limits.max_concurrent_lookups, 1);
        assert!(config.cache.path.is_none());
        assert!(config.unsplash.base_url.is_none());
        assert_eq!(config.cache.resolved_path(), default_store_path());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [limits]
            requests_per_hour = 20
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.limits.requests_per_hour, 20);
        // Defaults preserved
        assert_eq!(config.limits.upstream_timeout_secs, 10);
        assert_eq!(config.limits.max_concurrent_lookups, 1);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [cache]
            path = "/var/lib/larder/images.json"

            [unsplash]
            base_url = "http://localhost:8080"
            per_page = 10
            content_filter = "low"
            referral_source = "my_app"

            [limits]
            requests_per_hour = 45
            upstream_timeout_secs = 5
            max_concurrent_lookups = 4
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.cache.resolved_path(),
            PathBuf::from("/var/lib/larder/images.json")
        );
        assert_eq!(
            config.unsplash.base_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(config.unsplash.per_page, Some(10));
        assert_eq!(config.unsplash.content_filter.as_deref(), Some("low"));
        assert_eq!(config.unsplash.referral_source.as_deref(), Some("my_app"));
        assert_eq!(config.limits.requests_per_hour, 45);
        assert_eq!(config.limits.upstream_timeout_secs, 5);
        assert_eq!(config.limits.max_concurrent_lookups, 4);
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [unsplash]
            access_key = "unsplash-test-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(
            secrets.unsplash.as_ref().unwrap().access_key,
            "unsplash-test-key"
        );
        assert_eq!(
            secrets.unsplash_access_key(),
            Some("unsplash-test-key".to_string())
        );
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits]\nmax_concurrent_lookups = 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.limits.max_concurrent_lookups, 3);
    }

    #[test]
    fn malformed_config_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits\nrequests_per_hour = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, LarderError::Configuration(_)));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[cfg(unix)]
    #[test]
    fn insecure_secrets_file_is_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "[unsplash]\naccess_key = \"k\"\n").unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let err = Secrets::check_permissions(&path).unwrap_err();
        assert!(err.to_string().contains("insecure permissions 644"));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        assert!(Secrets::check_permissions(&path).is_ok());
    }

    #[tokio::test]
    async fn apply_sets_limits() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            requests_per_hour = 7
        "#,
        )
        .unwrap();
        let resolver = config
            .apply(ResolverBuilder::new(), None)
            .store(Arc::new(crate::store::MemoryStore::new()))
            .build()
            .unwrap();
        assert_eq!(resolver.rate_limiter().budget(), 7);
        assert!(!resolver.has_provider());
    }

    #[cfg(feature = "unsplash")]
    #[tokio::test]
    async fn apply_attaches_provider_with_key() {
        let resolver = Config::default()
            .apply(ResolverBuilder::new(), Some("key".to_string()))
            .store(Arc::new(crate::store::MemoryStore::new()))
            .build()
            .unwrap();
        assert!(resolver.has_provider());
    }
}
