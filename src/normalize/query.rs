//! Search phrase derivation for the image provider.

use std::collections::HashMap;

use super::Normalizer;

/// Hand-tuned search phrases for common ingredients, keyed by normalized
/// name. Order matters: the first key contained in a name wins when there
/// is no exact match, so longer keys come before their suffixes.
pub const DEFAULT_QUERY_MAPPINGS: &[(&str, &str)] = &[
    ("ground beef", "raw ground beef meat"),
    ("beef", "raw beef meat"),
    ("salt", "salt seasoning"),
    ("black pepper", "black pepper spice"),
    ("pepper", "black pepper spice"),
    ("burger buns", "hamburger buns bread"),
    ("buns", "hamburger buns bread"),
    ("lettuce leaves", "fresh lettuce leaves"),
    ("lettuce", "fresh lettuce"),
    ("tomato slices", "sliced tomatoes"),
    ("tomato", "fresh tomatoes"),
    ("red onion slices", "red onion slices"),
    ("red onion", "red onion vegetable"),
    ("onion", "onion vegetable"),
    ("pickle slices", "pickle slices"),
    ("pickles", "dill pickles"),
    ("american cheese slices", "american cheese slices"),
    ("american cheese", "american cheese"),
    ("cheese slices", "cheese slices"),
    ("cheese", "cheese"),
    ("mayonnaise", "mayonnaise jar"),
    ("mayo", "mayonnaise jar"),
    ("ketchup", "ketchup bottle"),
    ("yellow mustard", "yellow mustard bottle"),
    ("mustard", "mustard bottle"),
    ("relish", "pickle relish jar"),
    ("vegetable oil", "vegetable oil bottle"),
    ("olive oil", "olive oil bottle"),
    ("oil", "cooking oil bottle"),
    ("garlic", "fresh garlic"),
    ("ginger", "fresh ginger root"),
    ("butter", "butter block"),
    ("milk", "glass of milk"),
    ("cream", "heavy cream"),
    ("egg", "chicken eggs"),
    ("eggs", "chicken eggs"),
    ("flour", "all purpose flour"),
    ("sugar", "white sugar"),
    ("brown sugar", "brown sugar"),
    ("honey", "honey jar"),
    ("soy sauce", "soy sauce bottle"),
    ("vinegar", "vinegar bottle"),
    ("chicken", "raw chicken meat"),
    ("pork", "raw pork meat"),
    ("bacon", "bacon strips"),
    ("rice", "white rice grains"),
    ("pasta", "dry pasta"),
    ("noodles", "noodles"),
    ("carrot", "fresh carrots"),
    ("carrots", "fresh carrots"),
    ("potato", "fresh potatoes"),
    ("potatoes", "fresh potatoes"),
    ("celery", "celery stalks"),
    ("broccoli", "fresh broccoli"),
    ("spinach", "fresh spinach"),
    ("mushroom", "fresh mushrooms"),
    ("mushrooms", "fresh mushrooms"),
    ("lemon", "fresh lemons"),
    ("lime", "fresh limes"),
    ("parsley", "fresh parsley"),
    ("basil", "fresh basil"),
    ("cilantro", "fresh cilantro"),
    ("oregano", "dried oregano"),
    ("thyme", "fresh thyme"),
    ("rosemary", "fresh rosemary"),
    ("cumin", "cumin spice"),
    ("paprika", "paprika spice"),
    ("cinnamon", "cinnamon sticks"),
    ("vanilla", "vanilla extract"),
];

/// Builds image search phrases from ingredient names.
///
/// Lookup order: exact match on the normalized name, then the first
/// mapping key (in table order) contained in it, then
/// `"{normalized} food ingredient"`.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    normalizer: Normalizer,
    mappings: Vec<(String, String)>,
    exact: HashMap<String, usize>,
}

impl QueryBuilder {
    /// Build from an ordered mapping table. For duplicate keys the first
    /// entry wins.
    pub fn new<K, V>(normalizer: Normalizer, mappings: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mappings: Vec<(String, String)> = mappings
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        let mut exact = HashMap::with_capacity(mappings.len());
        for (index, (key, _)) in mappings.iter().enumerate() {
            exact.entry(key.clone()).or_insert(index);
        }

        Self {
            normalizer,
            mappings,
            exact,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Search phrase for a raw ingredient name.
    pub fn build(&self, raw: &str) -> String {
        self.for_normalized(&self.normalizer.normalize(raw))
    }

    /// Search phrase for an already-normalized name.
    pub fn for_normalized(&self, normalized: &str) -> String {
        if let Some(&index) = self.exact.get(normalized) {
            return self.mappings[index].1.clone();
        }

        self.mappings
            .iter()
            .find(|(key, _)| normalized.contains(key.as_str()))
            .map(|(_, query)| query.clone())
            .unwrap_or_else(|| format!("{normalized} food ingredient"))
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(Normalizer::default(), DEFAULT_QUERY_MAPPINGS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_uses_mapping() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.build("Onion"), "onion vegetable");
        assert_eq!(builder.build("Eggs"), "chicken eggs");
    }

    #[test]
    fn exact_match_beats_earlier_substring() {
        // "red onion" contains "onion", but the exact key wins
        let builder = QueryBuilder::default();
        assert_eq!(builder.build("red onion"), "red onion vegetable");
        assert_eq!(builder.build("brown sugar"), "brown sugar");
    }

    #[test]
    fn substring_match_uses_table_order() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.build("ground beef 80/20"), "raw ground beef meat");
        assert_eq!(builder.build("2 cloves garlic, minced"), "fresh garlic");
    }

    #[test]
    fn fallback_appends_food_ingredient() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.build("Saffron threads"), "saffron threads food ingredient");
    }

    #[test]
    fn query_is_derived_from_normalized_name() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.build("Fresh Thyme (a few sprigs)"), "fresh thyme");
        assert_eq!(builder.for_normalized("thyme"), "fresh thyme");
    }

    #[test]
    fn custom_table_order_breaks_ties() {
        let builder = QueryBuilder::new(
            Normalizer::default(),
            &[("pepper", "peppercorns"), ("bell pepper", "red bell pepper")],
        );
        assert_eq!(builder.build("roasted bell pepper"), "peppercorns");
        assert_eq!(builder.build("bell pepper"), "red bell pepper");
    }

    #[test]
    fn duplicate_keys_keep_first_entry() {
        let builder = QueryBuilder::new(Normalizer::default(), &[("egg", "a"), ("egg", "b")]);
        assert_eq!(builder.build("egg"), "a");
    }
}
