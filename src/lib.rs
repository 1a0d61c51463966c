//! Larder - ingredient image resolution for generated recipes
//!
//! This crate finds a representative photo for each ingredient of a
//! recipe. Names are normalized into cache keys, cached rows are reused
//! across recipes, and cache misses go to an image search provider under
//! an hourly request budget. Every failure short of a broken store
//! degrades to a placeholder image, so a recipe is never lost for want
//! of a picture.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use larder::{ImageResolver, IngredientInput, JsonFileStore};
//!
//! #[tokio::main]
//! async fn main() -> larder::Result<()> {
//!     let store = JsonFileStore::open_default().await?;
//!     let resolver = ImageResolver::builder()
//!         .store(Arc::new(store))
//!         .unsplash("your-access-key")
//!         .build()?;
//!
//!     let batch = resolver
//!         .resolve_many(&[
//!             IngredientInput::new("garlic", "2", "cloves"),
//!             IngredientInput::named("Salt"),
//!         ])
//!         .await?;
//!
//!     for ingredient in &batch.ingredients {
//!         println!("{}: {}", ingredient.name, ingredient.image_url);
//!     }
//!     for warning in &batch.warnings {
//!         eprintln!("{warning}");
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod limiter;
pub mod normalize;
pub mod providers;
pub mod recipe;
pub mod resolver;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use error::{LarderError, Result};
pub use limiter::RateLimiter;
pub use normalize::{Normalizer, QueryBuilder};
pub use providers::{ImageSearchProvider, PhotoCandidate, SearchResponse};
pub use recipe::{GeneratedRecipe, RecipeAssembler, RecipeDraft, RecipeRequest, RecipeSource};
pub use resolver::{ImageResolver, ResolverBuilder};
pub use store::{ImageStore, JsonFileStore, MemoryStore};
pub use version::{PKG_VERSION, version_string};

#[cfg(feature = "unsplash")]
pub use providers::UnsplashClient;

// Re-export all types
pub use types::{
    Attribution, BatchResolution, CacheClearReport, CachedImage, ImageSource, IngredientInput,
    ResolvedImage, ResolvedIngredient,
};
