use super::{Catalog, Translator};
use crate::error::{RewriteError, RewriteResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Builds a [`Translator`] for a locale from inline catalogues and from
/// per-domain language directories (`<dir>/<domain>-<locale>.yaml`).
#[derive(Debug, Clone, Default)]
pub struct TranslationLoader {
    domains: BTreeMap<String, Option<PathBuf>>,
    inline: HashMap<String, HashMap<String, Catalog>>,
}

impl TranslationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a text domain; `None` means the domain has no language files.
    pub fn with_domain(mut self, domain: impl Into<String>, dir: Option<PathBuf>) -> Self {
        self.domains.insert(domain.into(), dir);
        self
    }

    pub fn with_inline(mut self, locale: &str, domain: &str, catalog: Catalog) -> Self {
        self.inline
            .entry(locale.to_string())
            .or_default()
            .entry(domain.to_string())
            .or_default()
            .merge(catalog);
        self
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    /// Load every known domain for `locale`. Missing or broken files are
    /// skipped; the affected strings stay untranslated.
    pub fn load(&self, locale: &str) -> Translator {
        let mut translator = Translator::untranslated(locale);

        for (domain, dir) in &self.domains {
            let Some(dir) = dir else {
                continue;
            };
            if let Some(catalog) = read_catalog(dir, domain, locale) {
                translator.add_catalog(domain, catalog);
            }
        }

        // Inline catalogues come last so configuration can patch files.
        if let Some(domains) = self.inline.get(locale) {
            for (domain, catalog) in domains {
                translator.add_catalog(domain, catalog.clone());
            }
        }

        translator
    }
}

/// Read `<dir>/<domain>-<locale>.yaml`.
pub fn read_catalog_file(dir: &Path, domain: &str, locale: &str) -> RewriteResult<Catalog> {
    let path = dir.join(format!("{}-{}.yaml", domain, locale));
    let content = std::fs::read_to_string(&path)?;
    let catalog = serde_yaml::from_str::<Catalog>(&content)?;
    debug!("Loaded translations for {} from {}", domain, path.display());
    Ok(catalog)
}

/// Like [`read_catalog_file`], with failures logged and swallowed.
fn read_catalog(dir: &Path, domain: &str, locale: &str) -> Option<Catalog> {
    match read_catalog_file(dir, domain, locale) {
        Ok(catalog) => Some(catalog),
        Err(RewriteError::Io(e)) => {
            debug!(
                "No translation file for {} in {}: {} - using untranslated strings",
                domain,
                dir.display(),
                e
            );
            None
        }
        Err(e) => {
            warn!(
                "Ignoring unreadable translation file for {} in {}: {}",
                domain,
                dir.display(),
                e
            );
            None
        }
    }
}
