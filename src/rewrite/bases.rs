//! Base slugs: the localized literal segments (`events`, `month`, `page`,
//! ...) every rule is assembled from.

use super::cache::LocaleCache;
use super::hooks::Extensions;
use super::options::SiteOptions;
use crate::i18n::{sanitize_title, TranslationLoader, Translator, TEXT_DOMAIN};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Alternatives for one logical slug, untranslated default first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSlug {
    name: String,
    alternatives: Vec<String>,
}

impl BaseSlug {
    /// Blank alternatives are skipped and duplicates collapse onto their
    /// first occurrence. An empty result falls back to the name itself.
    pub fn new<I, S>(name: &str, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for alternative in alternatives {
            let alternative = alternative.into();
            if !alternative.is_empty() && !unique.contains(&alternative) {
                unique.push(alternative);
            }
        }
        if unique.is_empty() {
            unique.push(name.to_string());
        }

        Self {
            name: name.to_string(),
            alternatives: unique,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn untranslated(&self) -> &str {
        &self.alternatives[0]
    }

    /// The slug used when generating links: the last alternative.
    pub fn localized(&self) -> &str {
        self.alternatives
            .last()
            .map(String::as_str)
            .unwrap_or_else(|| self.untranslated())
    }

    /// Non-capturing alternation of the escaped alternatives.
    pub fn to_regex(&self) -> String {
        let escaped: Vec<String> = self
            .alternatives
            .iter()
            .map(|alternative| regex::escape(alternative))
            .collect();
        format!("(?:{})", escaped.join("|"))
    }
}

/// Named base slugs, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseSlugs {
    slugs: BTreeMap<String, BaseSlug>,
}

impl BaseSlugs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace (or add) the alternatives for `name`.
    pub fn set<I, S>(&mut self, name: &str, alternatives: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slugs
            .insert(name.to_string(), BaseSlug::new(name, alternatives));
    }

    pub fn get(&self, name: &str) -> Option<&BaseSlug> {
        self.slugs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BaseSlug> {
        self.slugs.values()
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    pub fn to_regex_map(&self) -> BTreeMap<String, String> {
        self.slugs
            .iter()
            .map(|(name, slug)| (name.clone(), slug.to_regex()))
            .collect()
    }
}

/// The outcome of [`BaseResolver::resolve`] for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBases {
    pub locale: String,
    pub slugs: BaseSlugs,
    pub regex: BTreeMap<String, String>,
}

impl ResolvedBases {
    pub fn slug(&self, name: &str) -> Option<&BaseSlug> {
        self.slugs.get(name)
    }

    pub fn regex(&self, name: &str) -> Option<&str> {
        self.regex.get(name).map(String::as_str)
    }
}

/// The stock base slugs for the locale `translator` was loaded for.
pub fn default_bases(translator: &Translator, options: &SiteOptions) -> BaseSlugs {
    let translate = |msgid: &str| sanitize_title(&translator.translate(TEXT_DOMAIN, msgid));
    let translate_ctx = |msgid: &str, context: &str| {
        sanitize_title(&translator.translate_with_context(TEXT_DOMAIN, msgid, context))
    };

    let single_slug = options.single_event_slug();
    let events_slug = options.events_slug();

    let mut bases = BaseSlugs::new();
    bases.set("month", ["month".to_string(), translate("month")]);
    bases.set("list", ["list".to_string(), translate("list")]);
    bases.set("today", ["today".to_string(), translate("today")]);
    bases.set("day", ["day".to_string(), translate("day")]);
    bases.set(
        "tag",
        ["tag".to_string(), translate_ctx("tag", "tag archive slug")],
    );
    bases.set(
        "tax",
        [
            "category".to_string(),
            translate_ctx("category", "category archive slug"),
        ],
    );
    bases.set(
        "page",
        [
            "page".to_string(),
            translator.translate_with_context(
                TEXT_DOMAIN,
                "page",
                "The \"/page/\" URL string component.",
            ),
        ],
    );
    bases.set("single", [single_slug.clone(), translate(&single_slug)]);
    bases.set("archive", [events_slug.clone(), translate(&events_slug)]);
    bases.set(
        "featured",
        [
            "featured".to_string(),
            translate_ctx("featured", "featured events slug"),
        ],
    );
    bases
}

/// Resolves and memoizes base slugs per site locale.
#[derive(Debug, Clone)]
pub struct BaseResolver {
    loader: TranslationLoader,
    options: SiteOptions,
    extensions: Extensions,
    defaults: LocaleCache<BaseSlugs>,
    resolved: LocaleCache<ResolvedBases>,
}

impl BaseResolver {
    pub fn new(loader: TranslationLoader, options: SiteOptions, extensions: Extensions) -> Self {
        Self {
            loader,
            options,
            extensions,
            defaults: LocaleCache::new("default bases"),
            resolved: LocaleCache::new("bases"),
        }
    }

    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    /// Base slugs for `site_locale`. Slugs are always generated in the site
    /// locale, even when the acting user browses in another one.
    pub fn resolve(&self, site_locale: &str, user_locale: Option<&str>) -> Arc<ResolvedBases> {
        if let Some(user_locale) = user_locale.filter(|user| *user != site_locale) {
            debug!(
                "User locale {} differs from site locale {}, loading site translations",
                user_locale, site_locale
            );
        }

        self.resolved
            .get_or_build(site_locale, || self.build(site_locale))
    }

    fn build(&self, locale: &str) -> ResolvedBases {
        let defaults = self.defaults.get_or_build(locale, || {
            let translator = self.loader.load(locale);
            default_bases(&translator, &self.options)
        });

        let mut slugs = (*defaults).clone();
        for hook in &self.extensions.base_overrides_raw {
            hook(&mut slugs);
        }

        // Overrides may have reintroduced duplicates.
        let mut unique = BaseSlugs::new();
        for slug in slugs.iter() {
            unique.set(slug.name(), slug.alternatives().to_vec());
        }

        let mut regex = unique.to_regex_map();
        for hook in &self.extensions.base_overrides_final {
            hook(&mut regex);
        }

        ResolvedBases {
            locale: locale.to_string(),
            slugs: unique,
            regex,
        }
    }

    pub fn clear(&self) {
        self.defaults.clear();
        self.resolved.clear();
    }
}
