//! Public types for the Larder API.

mod image;
mod ingredient;

pub use image::{
    Attribution, CachedImage, ImageSource, PLACEHOLDER_ATTRIBUTION_LINK,
    PLACEHOLDER_ATTRIBUTION_TEXT, ResolvedImage,
};
pub use ingredient::{
    BatchResolution, CacheClearReport, IngredientInput, ResolvedIngredient, missing_image_warning,
};
