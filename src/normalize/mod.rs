//! Ingredient name normalization.
//!
//! [`Normalizer`] turns free text such as `"2 cloves garlic, minced"` into
//! the cache key `"garlic"`; leading quantities, descriptor words,
//! parentheticals, punctuation and case never reach the key. [`QueryBuilder`] derives
//! the image search phrase from the same normalized form.
//!
//! Both are built from immutable, ordered tables so that two processes
//! configured alike produce identical keys and queries.

mod query;

pub use query::{DEFAULT_QUERY_MAPPINGS, QueryBuilder};

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Descriptor words and phrases stripped from ingredient names.
pub const DEFAULT_DESCRIPTORS: &[&str] = &[
    "organic",
    "optional",
    "for garnish",
    "to taste",
    "as needed",
    "large",
    "medium",
    "small",
    "boneless",
    "skinless",
    "peeled",
    "finely",
    "coarsely",
    "roughly",
    "thinly",
    "thickly",
    "fresh",
    "dried",
    "chopped",
    "minced",
    "diced",
    "sliced",
];

/// Units dropped when they directly follow a leading quantity
/// (`"2 cloves garlic"`). A unit on its own is left alone, so the spice
/// `"cloves"` keeps its name.
pub const MEASURE_UNITS: &[&str] = &[
    "cup", "cups", "tablespoon", "tablespoons", "tbsp", "teaspoon", "teaspoons", "tsp", "clove",
    "cloves", "pound", "pounds", "lb", "lbs", "ounce", "ounces", "oz", "gram", "grams", "g", "kg",
    "ml", "l", "liter", "liters", "pinch", "pinches", "dash", "dashes", "can", "cans", "slice",
    "slices", "piece", "pieces", "bunch", "bunches", "handful", "handfuls", "sprig", "sprigs",
    "stalk", "stalks", "head", "heads",
];

static LEADING_MEASURE: LazyLock<Regex> = LazyLock::new(|| {
    let units = MEASURE_UNITS.join("|");
    Regex::new(&format!(r"^\s*(?:\d+\s+)+(?:(?:{units})\b)?")).expect("static pattern")
});
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("static pattern"));
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("static pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Canonicalizes raw ingredient names into cache keys.
///
/// `normalize` is pure, total and idempotent.
///
/// ```rust
/// # use larder::Normalizer;
/// let normalizer = Normalizer::default();
/// assert_eq!(normalizer.normalize("Fresh Basil (Thai)"), "basil");
/// assert_eq!(normalizer.normalize("basil, chopped"), "basil");
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer {
    descriptors: Vec<String>,
    pattern: Option<Regex>,
}

impl Normalizer {
    /// Build a normalizer stripping the given descriptors.
    ///
    /// Descriptors match whole words only, case-insensitively; words in a
    /// multi-word descriptor may be separated by any run of whitespace.
    pub fn new<S: AsRef<str>>(descriptors: &[S]) -> Self {
        let descriptors: Vec<String> = descriptors
            .iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        let pattern = if descriptors.is_empty() {
            None
        } else {
            let alternation = descriptors
                .iter()
                .map(|d| {
                    d.split_whitespace()
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(r"\s+")
                })
                .collect::<Vec<_>>()
                .join("|");
            Some(
                Regex::new(&format!(r"\b(?:{alternation})\b"))
                    .expect("descriptor pattern is built from escaped literals"),
            )
        };

        Self {
            descriptors,
            pattern,
        }
    }

    /// The descriptor table, in construction order.
    pub fn descriptors(&self) -> &[String] {
        &self.descriptors
    }

    /// Normalize a raw ingredient name into its cache key.
    ///
    /// May return an empty string (e.g. for `"(optional)"`).
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        let without_parens = PARENTHETICAL.replace_all(&lowered, " ");
        let mut cleaned = NON_ALPHANUMERIC
            .replace_all(&without_parens, " ")
            .into_owned();

        // Removing one descriptor can bring the words of another together,
        // or expose a quantity, so strip until nothing matches.
        loop {
            let mut changed = false;
            if let Some(pattern) = &self.pattern
                && let Some(next) = owned(pattern.replace_all(&cleaned, " "))
            {
                cleaned = next;
                changed = true;
            }
            if let Some(next) = owned(LEADING_MEASURE.replace(&cleaned, "")) {
                cleaned = next;
                changed = true;
            }
            if !changed {
                break;
            }
        }

        WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
    }
}

/// The replacement text, if a regex replacement changed anything.
fn owned(replaced: Cow<'_, str>) -> Option<String> {
    match replaced {
        Cow::Borrowed(_) => None,
        Cow::Owned(text) => Some(text),
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIPTORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        Normalizer::default().normalize(raw)
    }

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Garlic  "), "garlic");
    }

    #[test]
    fn strips_parentheticals() {
        assert_eq!(normalize("tomatoes (about 3)"), "tomatoes");
        assert_eq!(normalize("rice(basmati)flour"), "rice flour");
    }

    #[test]
    fn strips_descriptors() {
        assert_eq!(normalize("Finely Chopped Fresh Parsley"), "parsley");
        assert_eq!(normalize("salt, to taste"), "salt");
        assert_eq!(normalize("large boneless skinless chicken breast"), "chicken breast");
    }

    #[test]
    fn descriptor_matching_respects_word_boundaries() {
        assert_eq!(normalize("organ meat"), "organ meat");
        assert_eq!(normalize("smallish onion"), "smallish onion");
        assert_eq!(normalize("freshwater fish"), "freshwater fish");
    }

    #[test]
    fn strips_leading_quantities_and_units() {
        assert_eq!(normalize("2 cloves garlic, minced"), "garlic");
        assert_eq!(normalize("1/2 cup flour"), "flour");
        assert_eq!(normalize("3 eggs"), "eggs");
        assert_eq!(normalize("2 large eggs"), "eggs");
    }

    #[test]
    fn units_without_quantity_are_kept() {
        assert_eq!(normalize("Cloves"), "cloves");
        assert_eq!(normalize("ground cloves"), "ground cloves");
        assert_eq!(normalize("7 grain bread"), "grain bread");
        assert_eq!(normalize("ground beef 80/20"), "ground beef 80 20");
    }

    #[test]
    fn replaces_punctuation() {
        assert_eq!(normalize("ground beef 80/20"), "ground beef 80 20");
        assert_eq!(normalize("baker's yeast"), "baker s yeast");
    }

    #[test]
    fn multi_word_descriptor_across_punctuation() {
        assert_eq!(normalize("pepper, to-taste"), "pepper");
        assert_eq!(normalize("salt (to taste)"), "salt");
    }

    #[test]
    fn descriptor_revealed_by_removal_is_stripped() {
        assert_eq!(normalize("cilantro for fresh garnish"), "cilantro");
    }

    #[test]
    fn empty_and_descriptor_only_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("(optional)"), "");
        assert_eq!(normalize("fresh, chopped"), "");
        assert_eq!(normalize("2 cups"), "");
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(normalize("Jalapeño"), "jalape o");
        assert_eq!(normalize("crème fraîche"), "cr me fra che");
    }

    #[test]
    fn idempotent_on_samples() {
        for raw in [
            "2 cloves garlic, minced",
            "Salt & Pepper (to taste)",
            "cilantro for fresh garnish",
            "to fresh taste",
            "ÉCHALOTE",
            "ground beef 80/20",
            "1/2 cup 2 fresh cloves",
            "(optional",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn custom_descriptor_table() {
        let normalizer = Normalizer::new(&["extra virgin"]);
        assert_eq!(normalizer.normalize("Extra  Virgin Olive Oil"), "olive oil");
        // default descriptors are not applied
        assert_eq!(normalizer.normalize("fresh basil"), "fresh basil");
    }

    #[test]
    fn empty_descriptor_table() {
        let normalizer = Normalizer::new::<&str>(&[]);
        assert!(normalizer.descriptors().is_empty());
        assert_eq!(normalizer.normalize("Fresh  Basil!"), "fresh basil");
    }
}
