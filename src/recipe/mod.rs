//! Recipe assembly: decorates generated recipes with ingredient photos.
//!
//! Recipe text comes from a language model behind [`RecipeSource`]; this
//! module treats it as an opaque [`RecipeDraft`] and only adds images and
//! warnings. A recipe whose images cannot be found is still returned in
//! full, with one warning per missing image.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::resolver::ImageResolver;
use crate::types::{CacheClearReport, IngredientInput, ResolvedIngredient};
use crate::{LarderError, Result};

/// How the recipe was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RecipeRequest {
    /// Generate a recipe for a named dish.
    #[serde(rename_all = "camelCase")]
    MealName { meal_name: String },
    /// Generate a recipe using what's on hand.
    #[serde(rename_all = "camelCase")]
    FromIngredients { ingredients: Vec<String> },
}

/// Recipe text as produced by the language model, before images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub servings: u32,
    pub estimated_time_minutes: u32,
    pub ingredients: Vec<IngredientInput>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// A finished recipe with ingredient photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub title: String,
    pub servings: u32,
    pub estimated_time_minutes: u32,
    pub ingredients: Vec<ResolvedIngredient>,
    pub steps: Vec<String>,
    pub tips: Vec<String>,
    pub warnings: Vec<String>,
}

/// Produces recipe drafts (the text-generation collaborator).
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn draft(&self, request: &RecipeRequest) -> Result<RecipeDraft>;
}

/// Combines recipe drafts with resolved ingredient images.
pub struct RecipeAssembler {
    resolver: Arc<ImageResolver>,
    source: Option<Arc<dyn RecipeSource>>,
}

impl RecipeAssembler {
    pub fn new(resolver: Arc<ImageResolver>) -> Self {
        Self {
            resolver,
            source: None,
        }
    }

    /// Attach the recipe text source used by [`generate`](Self::generate).
    pub fn with_source(mut self, source: Arc<dyn RecipeSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    /// Draft a recipe and decorate it with images.
    pub async fn generate(&self, request: &RecipeRequest) -> Result<GeneratedRecipe> {
        let source = self.source.as_ref().ok_or_else(|| {
            LarderError::Configuration("no recipe source configured".to_string())
        })?;
        let draft = source.draft(request).await?;
        info!(title = %draft.title, "recipe drafted");
        self.assemble(draft).await
    }

    /// Decorate a draft with ingredient images.
    ///
    /// Warnings are the draft's own followed by one per missing image.
    pub async fn assemble(&self, draft: RecipeDraft) -> Result<GeneratedRecipe> {
        let batch = self.resolver.resolve_many(&draft.ingredients).await?;

        let mut warnings = draft.warnings;
        warnings.extend(batch.warnings);

        info!(
            title = %draft.title,
            ingredients = batch.ingredients.len(),
            "recipe complete"
        );

        Ok(GeneratedRecipe {
            title: draft.title,
            servings: draft.servings,
            estimated_time_minutes: draft.estimated_time_minutes,
            ingredients: batch.ingredients,
            steps: draft.steps,
            tips: draft.tips,
            warnings,
        })
    }

    /// Clear every cached ingredient image.
    pub async fn clear_image_cache(&self) -> Result<CacheClearReport> {
        info!("clearing all cached ingredient images");
        let cleared = self.resolver.clear_cache().await?;
        Ok(CacheClearReport::new(cleared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_parses_model_json() {
        let json = r#"{
            "title": "Garlic Butter Pasta",
            "servings": 2,
            "estimatedTimeMinutes": 20,
            "ingredients": [
                {"name": "spaghetti", "amount": "200", "unit": "g"},
                {"name": "Salt"}
            ],
            "steps": ["Boil pasta."]
        }"#;
        let draft: RecipeDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.estimated_time_minutes, 20);
        assert_eq!(draft.ingredients.len(), 2);
        assert_eq!(draft.ingredients[1].unit, "");
        assert!(draft.tips.is_empty());
        assert!(draft.warnings.is_empty());
    }

    #[test]
    fn request_modes_are_tagged() {
        let request: RecipeRequest =
            serde_json::from_str(r#"{"mode": "mealName", "mealName": "ramen"}"#).unwrap();
        assert_eq!(
            request,
            RecipeRequest::MealName {
                meal_name: "ramen".into()
            }
        );

        let request: RecipeRequest = serde_json::from_str(
            r#"{"mode": "fromIngredients", "ingredients": ["eggs", "rice"]}"#,
        )
        .unwrap();
        assert!(matches!(
            request,
            RecipeRequest::FromIngredients { ingredients } if ingredients.len() == 2
        ));
    }
}
