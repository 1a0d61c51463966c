//! Telemetry metric name constants.
//!
//! Centralised metric names for image resolution. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `larder_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: image search provider name (e.g. "unsplash")
//! - `status`: upstream outcome: "ok", "empty" or "error"
//! - `reason`: why a placeholder was returned

/// Cache lookups answered by a valid stored row.
pub const CACHE_HITS_TOTAL: &str = "larder_cache_hits_total";

/// Cache lookups that found no valid row.
pub const CACHE_MISSES_TOTAL: &str = "larder_cache_misses_total";

/// Stale rows (placeholder source or empty URL) deleted before a lookup.
pub const CACHE_EVICTIONS_TOTAL: &str = "larder_cache_evictions_total";

/// Upstream search attempts.
///
/// Labels: `provider`, `status` ("ok" | "empty" | "error").
pub const UPSTREAM_REQUESTS_TOTAL: &str = "larder_upstream_requests_total";

/// Upstream search duration in seconds.
///
/// Labels: `provider`.
pub const UPSTREAM_REQUEST_DURATION_SECONDS: &str = "larder_upstream_request_duration_seconds";

/// Upstream attempts refused by the hourly budget.
pub const RATE_LIMITED_TOTAL: &str = "larder_rate_limited_total";

/// Resolutions that degraded to a placeholder image.
///
/// Labels: `reason` ("no_provider" | "rate_limited" | "upstream_error" |
/// "no_results" | "empty_name"). A batch counts each distinct key once.
pub const PLACEHOLDERS_TOTAL: &str = "larder_placeholders_total";
