use crate::i18n::{Catalog, TranslationLoader, TEXT_DOMAIN};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct I18nConfig {
    /// Text domain -> directory of `<domain>-<locale>.yaml` catalogues.
    #[serde(default)]
    pub domains: BTreeMap<String, PathBuf>,
    /// Locale -> text domain -> inline catalogue.
    #[serde(default)]
    pub translations: BTreeMap<String, BTreeMap<String, Catalog>>,
}

impl I18nConfig {
    /// Relative directories are taken from `base_dir` (the config file's
    /// directory) when given.
    pub fn translation_loader(&self, base_dir: Option<&Path>) -> TranslationLoader {
        let mut loader = TranslationLoader::new();
        if !self.domains.contains_key(TEXT_DOMAIN) {
            loader = loader.with_domain(TEXT_DOMAIN, None);
        }

        for (domain, dir) in &self.domains {
            let dir = match base_dir {
                Some(base) if dir.is_relative() => base.join(dir),
                _ => dir.clone(),
            };
            loader = loader.with_domain(domain.clone(), Some(dir));
        }

        for (locale, domains) in &self.translations {
            for (domain, catalog) in domains {
                loader = loader.with_inline(locale, domain, catalog.clone());
            }
        }
        loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_inline_translations() {
        let config: I18nConfig = serde_yaml::from_str(
            r#"
translations:
  de_DE:
    the-events-calendar:
      messages:
        month: Monat
"#,
        )
        .unwrap();

        let translator = config.translation_loader(None).load("de_DE");
        assert_eq!(translator.translate(TEXT_DOMAIN, "month"), "Monat");
        assert_eq!(translator.translate(TEXT_DOMAIN, "list"), "list");
    }

    #[test]
    fn test_relative_domain_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lang")).unwrap();
        let mut file =
            std::fs::File::create(dir.path().join("lang/the-events-calendar-fr_FR.yaml")).unwrap();
        writeln!(file, "messages:\n  list: Liste").unwrap();

        let config: I18nConfig = serde_yaml::from_str(
            r#"
domains:
  the-events-calendar: lang
"#,
        )
        .unwrap();

        let loader = config.translation_loader(Some(dir.path()));
        assert_eq!(loader.domains().collect::<Vec<_>>(), vec![TEXT_DOMAIN]);
        assert_eq!(
            loader.load("fr_FR").translate(TEXT_DOMAIN, "list"),
            "Liste"
        );
    }
}
