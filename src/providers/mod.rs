//! Image search providers.

pub mod traits;
#[cfg(feature = "unsplash")]
pub mod unsplash;

pub use traits::{ImageSearchProvider, PhotoCandidate, SearchResponse};
#[cfg(feature = "unsplash")]
pub use unsplash::UnsplashClient;
