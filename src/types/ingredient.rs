//! Batch resolution inputs and outputs

use serde::{Deserialize, Serialize};

use super::image::{Attribution, ImageSource, ResolvedImage};

/// An ingredient line as produced by recipe generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub unit: String,
}

impl IngredientInput {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            unit: unit.into(),
        }
    }

    /// Ingredient with no amount or unit.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, "", "")
    }
}

/// An ingredient decorated with its photo.
///
/// `name` keeps the original free text; the cache only ever sees the
/// normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIngredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
    pub image_url: String,
    pub image_source: ImageSource,
    pub attribution: Attribution,
}

impl ResolvedIngredient {
    pub fn new(input: &IngredientInput, image: ResolvedImage) -> Self {
        Self {
            name: input.name.clone(),
            amount: input.amount.clone(),
            unit: input.unit.clone(),
            image_url: image.image_url,
            image_source: image.source,
            attribution: image.attribution,
        }
    }
}

/// Result of [`ImageResolver::resolve_many`](crate::ImageResolver::resolve_many).
///
/// `ingredients[i]` always corresponds to input `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResolution {
    pub ingredients: Vec<ResolvedIngredient>,
    pub warnings: Vec<String>,
}

/// Warning attached to an ingredient that ended up with a placeholder.
pub fn missing_image_warning(original_name: &str) -> String {
    format!("Could not find image for \"{original_name}\"")
}

/// Response of the administrative cache clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearReport {
    pub message: String,
    pub cleared_count: u64,
}

impl CacheClearReport {
    pub fn new(cleared_count: u64) -> Self {
        Self {
            message: format!("Cleared {cleared_count} cached ingredient images"),
            cleared_count,
        }
    }
}
