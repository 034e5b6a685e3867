//! Matchers that depend on live data, computed per request.

use super::bases::ResolvedBases;
use super::matchers::alternatives_from_regex;
use super::{QueryVars, TAX_HIERARCHY_PATTERN};
use crate::taxonomy::{TaxonomyStore, EVENT_CATEGORY};
use tracing::debug;

/// Segment-run regex -> replacement path, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicMatchers {
    entries: Vec<(String, String)>,
}

impl DynamicMatchers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, regex: impl Into<String>, value: impl Into<String>) {
        let regex = regex.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == regex) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((regex, value)),
        }
    }

    pub fn get(&self, regex: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == regex)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(regex, value)| (regex.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Built-in dynamic matchers for `query_vars`.
///
/// When an event category is queried and the term exists, the category
/// segment and the term capture are replaced with the localized category
/// slug followed by the term's ancestor path, root first. A comma-joined
/// multi-term value never names an existing term, so it gets no matcher
/// and stays a plain literal in the generated path.
pub fn category_matchers(
    query_vars: &QueryVars,
    bases: &ResolvedBases,
    store: &dyn TaxonomyStore,
) -> DynamicMatchers {
    let mut matchers = DynamicMatchers::new();

    let Some(category) = query_vars.get(EVENT_CATEGORY) else {
        return matchers;
    };
    let Some(cat_regex) = bases.regex("tax") else {
        return matchers;
    };
    // The localized version is the last alternative.
    let Some(localized_slug) =
        alternatives_from_regex(cat_regex).and_then(|slugs| slugs.last().cloned())
    else {
        return matchers;
    };

    let Some(path) = store.term_path(EVENT_CATEGORY, category) else {
        debug!("No {} term for slug {}", EVENT_CATEGORY, category);
        return matchers;
    };

    let value = format!("{}/{}", localized_slug, path.join("/"));
    matchers.insert(
        format!("(?:{})/{}", cat_regex, TAX_HIERARCHY_PATTERN),
        value.clone(),
    );
    matchers.insert(format!("{}/{}", cat_regex, TAX_HIERARCHY_PATTERN), value);
    matchers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::bases::BaseSlugs;
    use crate::taxonomy::{Term, TermTable};

    fn bases() -> ResolvedBases {
        let mut slugs = BaseSlugs::new();
        slugs.set("tax", ["category", "kategorie"]);
        ResolvedBases {
            locale: "de_DE".to_string(),
            regex: slugs.to_regex_map(),
            slugs,
        }
    }

    fn terms() -> TermTable {
        let mut table = TermTable::new();
        table.insert(EVENT_CATEGORY, Term::new("arts", None));
        table.insert(EVENT_CATEGORY, Term::new("music", Some("arts")));
        table
    }

    fn vars(category: &str) -> QueryVars {
        QueryVars::from([(EVENT_CATEGORY.to_string(), category.to_string())])
    }

    #[test]
    fn test_hierarchical_category_path() {
        let matchers = category_matchers(&vars("music"), &bases(), &terms());

        assert_eq!(matchers.len(), 2);
        assert_eq!(
            matchers.get("(?:category|kategorie)/(?:[^/]+/)*([^/]+)"),
            Some("kategorie/arts/music")
        );
        assert_eq!(
            matchers.get("(?:(?:category|kategorie))/(?:[^/]+/)*([^/]+)"),
            Some("kategorie/arts/music")
        );
    }

    #[test]
    fn test_no_matchers_without_category() {
        assert!(category_matchers(&QueryVars::new(), &bases(), &terms()).is_empty());
        assert!(category_matchers(&vars("unknown"), &bases(), &terms()).is_empty());
    }

    #[test]
    fn test_multi_term_value_has_no_matcher() {
        assert!(category_matchers(&vars("arts,music"), &bases(), &terms()).is_empty());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut matchers = DynamicMatchers::new();
        matchers.insert("a", "1");
        matchers.insert("b", "2");
        matchers.insert("a", "3");
        assert_eq!(matchers.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
    }
}
