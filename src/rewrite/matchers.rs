//! Localized matchers: the reverse table from a rule's segment regex to the
//! query variable it stands for and the slug to print in outbound links.

use super::bases::ResolvedBases;
use super::options::{SiteOptions, DEFAULT_EVENTS_SLUG, EVENTS_SLUG_OPTION};
use crate::taxonomy::EVENT_CATEGORY;

pub const EVENT_DATE_VAR: &str = "eventDate";
pub const EVENT_DISPLAY_VAR: &str = "eventDisplay";

const DATE_MATCHERS: [&str; 2] = [r"(\d{4}-\d{2})", r"(\d{4}-\d{2}-\d{2})"];

/// Base slug name -> query variable, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryVarMap {
    entries: Vec<(String, String)>,
}

impl Default for QueryVarMap {
    fn default() -> Self {
        let entries = [
            ("month", EVENT_DISPLAY_VAR),
            ("list", EVENT_DISPLAY_VAR),
            ("today", EVENT_DISPLAY_VAR),
            ("day", EVENT_DISPLAY_VAR),
            ("tag", "tag"),
            ("tax", EVENT_CATEGORY),
            ("single", "name"),
            ("archive", "post_type"),
            ("featured", "featured"),
        ]
        .into_iter()
        .map(|(base, var)| (base.to_string(), var.to_string()))
        .collect();
        Self { entries }
    }
}

impl QueryVarMap {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Map `base` to `query_var`, replacing any previous mapping of `base`.
    pub fn insert(&mut self, base: &str, query_var: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == base) {
            Some(entry) => entry.1 = query_var.to_string(),
            None => self
                .entries
                .push((base.to_string(), query_var.to_string())),
        }
    }

    pub fn remove(&mut self, base: &str) {
        self.entries.retain(|(name, _)| name != base);
    }

    pub fn query_var_for(&self, base: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == base)
            .map(|(_, var)| var.as_str())
    }

    /// Every base mapped to `query_var`.
    pub fn bases_for<'a>(&'a self, query_var: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(_, var)| var == query_var)
            .map(|(base, _)| base.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(base, var)| (base.as_str(), var.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedMatcher {
    pub base: String,
    pub query_var: String,
    pub en_slug: String,
    pub localized_slugs: Vec<String>,
    /// Printed in outbound links.
    pub localized_slug: String,
}

impl LocalizedMatcher {
    fn new(base: &str, query_var: &str, en_slug: &str, localized_slugs: Vec<String>) -> Self {
        let localized_slug = localized_slugs
            .last()
            .cloned()
            .unwrap_or_else(|| en_slug.to_string());
        Self {
            base: base.to_string(),
            query_var: query_var.to_string(),
            en_slug: en_slug.to_string(),
            localized_slugs,
            localized_slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// A base slug segment.
    Localized(LocalizedMatcher),
    /// A capturing segment whose text is the value of a query variable.
    QueryVar(String),
}

impl Matcher {
    pub fn query_var(&self) -> &str {
        match self {
            Matcher::Localized(matcher) => &matcher.query_var,
            Matcher::QueryVar(var) => var,
        }
    }
}

/// Segment regex -> matcher, in insertion order. Re-inserting a key
/// replaces its matcher in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedMatchers {
    entries: Vec<(String, Matcher)>,
}

impl LocalizedMatchers {
    /// Matchers for the resolved bases, the date captures and the renamed
    /// archive slug.
    pub fn build(bases: &ResolvedBases, map: &QueryVarMap, options: &SiteOptions) -> Self {
        let mut matchers = Self::default();

        for (base, query_var) in map.iter() {
            let Some(regex) = bases.regex(base) else {
                continue;
            };
            let alternatives = match bases.slug(base) {
                Some(slug) => slug.alternatives().to_vec(),
                None => match alternatives_from_regex(regex) {
                    Some(alternatives) => alternatives,
                    None => continue,
                },
            };
            let en_slug = alternatives[0].clone();
            matchers.insert(
                regex,
                Matcher::Localized(LocalizedMatcher::new(base, query_var, &en_slug, alternatives)),
            );
        }

        for date in DATE_MATCHERS {
            matchers.insert(date, Matcher::QueryVar(EVENT_DATE_VAR.to_string()));
        }

        let current_slug = options.get(EVENTS_SLUG_OPTION, DEFAULT_EVENTS_SLUG);
        for (key, matcher) in
            option_controlled_slug_entry(&matchers, DEFAULT_EVENTS_SLUG, &current_slug)
        {
            matchers.insert(&key, matcher);
        }

        matchers
    }

    pub fn insert(&mut self, key: &str, matcher: Matcher) {
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some(entry) => entry.1 = matcher,
            None => self.entries.push((key.to_string(), matcher)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Matcher> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, matcher)| matcher)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// First base matcher for `query_var`.
    pub fn matcher_for(&self, query_var: &str) -> Option<&LocalizedMatcher> {
        self.localized().find(|matcher| matcher.query_var == query_var)
    }

    /// Base matcher for `query_var` whose untranslated slug is `value`,
    /// e.g. `eventDisplay=month` -> the `month` base.
    pub fn matcher_for_value(&self, query_var: &str, value: &str) -> Option<&LocalizedMatcher> {
        self.localized()
            .find(|matcher| matcher.query_var == query_var && matcher.en_slug == value)
            .or_else(|| self.matcher_for(query_var))
    }

    pub fn query_var_for(&self, key: &str) -> Option<&str> {
        self.get(key).map(Matcher::query_var)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Matcher)> {
        self.entries
            .iter()
            .map(|(key, matcher)| (key.as_str(), matcher))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn localized(&self) -> impl Iterator<Item = &LocalizedMatcher> {
        self.entries.iter().filter_map(|(_, matcher)| match matcher {
            Matcher::Localized(localized) => Some(localized),
            Matcher::QueryVar(_) => None,
        })
    }
}

/// Extra matchers for a slug the site operator renamed.
///
/// Returns nothing when the slug is unchanged or no `post_type` matcher
/// exists. Otherwise returns two entries: one keyed by the default slug
/// alone, one keyed by the union of default, renamed and localized slugs.
pub fn option_controlled_slug_entry(
    matchers: &LocalizedMatchers,
    default_slug: &str,
    current_slug: &str,
) -> Vec<(String, Matcher)> {
    if default_slug == current_slug {
        return Vec::new();
    }
    let Some(target) = matchers.localized().find(|matcher| matcher.query_var == "post_type") else {
        return Vec::new();
    };

    let mut slugs: Vec<String> = Vec::new();
    for slug in [default_slug, current_slug]
        .into_iter()
        .chain(target.localized_slugs.iter().map(String::as_str))
    {
        if !slugs.iter().any(|existing| existing == slug) {
            slugs.push(slug.to_string());
        }
    }

    let entry = || {
        Matcher::Localized(LocalizedMatcher::new(
            &target.base,
            "post_type",
            &target.en_slug,
            slugs.clone(),
        ))
    };
    let union = slugs
        .iter()
        .map(|slug| regex::escape(slug))
        .collect::<Vec<_>>()
        .join("|");

    vec![
        (format!("(?:{})", regex::escape(default_slug)), entry()),
        (format!("(?:{})", union), entry()),
    ]
}

/// Alternatives of a `(?:a|b)` base regex, unescaped.
pub fn alternatives_from_regex(regex: &str) -> Option<Vec<String>> {
    let inner = regex.strip_prefix("(?:")?.strip_suffix(')')?;
    if inner.is_empty() || inner.contains(['(', ')']) {
        return None;
    }
    Some(inner.split('|').map(unescape).collect())
}

/// Undo `regex::escape`.
pub fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(c);
        }
    }
    result
}
