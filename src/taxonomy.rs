//! Hierarchical taxonomy terms, as far as permalinks need them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Event category taxonomy.
pub const EVENT_CATEGORY: &str = "tribe_events_cat";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Term {
    pub slug: String,
    #[serde(default)]
    pub parent: Option<String>,
}

impl Term {
    pub fn new(slug: &str, parent: Option<&str>) -> Self {
        Self {
            slug: slug.to_string(),
            parent: parent.map(str::to_string),
        }
    }
}

/// Read access to the term hierarchy of the host site.
pub trait TaxonomyStore: Send + Sync {
    fn term_by_slug(&self, taxonomy: &str, slug: &str) -> Option<Term>;

    /// Slugs from the root ancestor down to (and including) `slug`.
    fn term_path(&self, taxonomy: &str, slug: &str) -> Option<Vec<String>> {
        let mut term = self.term_by_slug(taxonomy, slug)?;
        let mut path = vec![term.slug.clone()];

        while let Some(parent) = term.parent.clone() {
            // Broken parent links end the walk instead of failing it.
            let Some(parent_term) = self.term_by_slug(taxonomy, &parent) else {
                break;
            };
            if path.contains(&parent_term.slug) {
                warn!(
                    "Term hierarchy cycle detected in {} at '{}'",
                    taxonomy,
                    parent_term.slug
                );
                break;
            }
            path.push(parent_term.slug.clone());
            term = parent_term;
        }

        path.reverse();
        Some(path)
    }
}

/// In-memory term table, usually loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct TermTable {
    taxonomies: HashMap<String, HashMap<String, Term>>,
}

impl TermTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, taxonomy: &str, term: Term) {
        self.taxonomies
            .entry(taxonomy.to_string())
            .or_default()
            .insert(term.slug.clone(), term);
    }

    pub fn from_config(config: &HashMap<String, Vec<Term>>) -> Self {
        let mut table = Self::new();
        for (taxonomy, terms) in config {
            for term in terms {
                table.insert(taxonomy, term.clone());
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.taxonomies.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaxonomyStore for TermTable {
    fn term_by_slug(&self, taxonomy: &str, slug: &str) -> Option<Term> {
        self.taxonomies.get(taxonomy)?.get(slug).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(slug: &str, parent: Option<&str>) -> Term {
        Term::new(slug, parent)
    }

    #[test]
    fn test_term_path_root_to_leaf() {
        let mut table = TermTable::new();
        table.insert(EVENT_CATEGORY, term("arts", None));
        table.insert(EVENT_CATEGORY, term("music", Some("arts")));
        table.insert(EVENT_CATEGORY, term("jazz", Some("music")));

        assert_eq!(
            table.term_path(EVENT_CATEGORY, "jazz").unwrap(),
            vec!["arts", "music", "jazz"]
        );
        assert_eq!(table.term_path(EVENT_CATEGORY, "arts").unwrap(), vec!["arts"]);
        assert!(table.term_path(EVENT_CATEGORY, "missing").is_none());
        assert!(table.term_path("post_tag", "arts").is_none());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_term_path_survives_cycles_and_orphans() {
        let mut table = TermTable::new();
        table.insert(EVENT_CATEGORY, term("a", Some("b")));
        table.insert(EVENT_CATEGORY, term("b", Some("a")));
        table.insert(EVENT_CATEGORY, term("orphan", Some("gone")));

        assert_eq!(table.term_path(EVENT_CATEGORY, "a").unwrap(), vec!["b", "a"]);
        assert_eq!(
            table.term_path(EVENT_CATEGORY, "orphan").unwrap(),
            vec!["orphan"]
        );
    }
}
