//! Translation lookup for the localized slugs.
//!
//! Catalogues are plain YAML maps (`messages` for `msgid -> msgstr`,
//! `contexts` for `context -> msgid -> msgstr`), grouped by text domain and
//! locale. A missing entry always falls back to the untranslated string.

pub mod loader;
pub mod slug;

pub use loader::TranslationLoader;
pub use slug::sanitize_title;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Text domain holding the calendar's own strings.
pub const TEXT_DOMAIN: &str = "the-events-calendar";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub messages: HashMap<String, String>,
    #[serde(default)]
    pub contexts: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Entries of `other` win over the existing ones.
    pub fn merge(&mut self, other: Catalog) {
        self.messages.extend(other.messages);
        for (context, entries) in other.contexts {
            self.contexts.entry(context).or_default().extend(entries);
        }
    }
}

/// All the catalogues loaded for a single locale.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    locale: String,
    domains: HashMap<String, Catalog>,
}

impl Translator {
    pub fn new(locale: impl Into<String>, domains: HashMap<String, Catalog>) -> Self {
        Self {
            locale: locale.into(),
            domains,
        }
    }

    /// A translator that returns every string untouched.
    pub fn untranslated(locale: impl Into<String>) -> Self {
        Self::new(locale, HashMap::new())
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn add_catalog(&mut self, domain: &str, catalog: Catalog) {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .merge(catalog);
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.contains_key(domain)
    }

    pub fn translate(&self, domain: &str, msgid: &str) -> String {
        self.domains
            .get(domain)
            .and_then(|catalog| catalog.messages.get(msgid))
            .filter(|msgstr| !msgstr.is_empty())
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }

    pub fn translate_with_context(&self, domain: &str, msgid: &str, context: &str) -> String {
        let Some(catalog) = self.domains.get(domain) else {
            return msgid.to_string();
        };

        catalog
            .contexts
            .get(context)
            .and_then(|entries| entries.get(msgid))
            .or_else(|| catalog.messages.get(msgid))
            .filter(|msgstr| !msgstr.is_empty())
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }
}
