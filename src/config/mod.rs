pub mod helper;
pub mod i18n_config;
pub mod loader;
pub mod rules_config;
pub mod server_config;
pub mod site_config;

pub use i18n_config::I18nConfig;
pub use loader::{find_config_path, load_config, load_or_default};
pub use rules_config::{ConfiguredRule, RuleConfig};
pub use server_config::ServerConfig;
pub use site_config::SiteConfig;

use crate::i18n::TranslationLoader;
use crate::rewrite::hooks::Extensions;
use crate::rewrite::options::SiteOptions;
use crate::rewrite::Rewriter;
use crate::taxonomy::{Term, TermTable};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::convert::TryFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main configuration structure matching config.yaml format
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub options: SiteOptions,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub taxonomies: HashMap<String, Vec<Term>>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Base slug name -> alternatives, replacing the defaults.
    #[serde(default)]
    pub bases: BTreeMap<String, Vec<String>>,
    /// Extra base slug -> query variable mappings.
    #[serde(default)]
    pub query_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub flush_on_start: bool,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_file(config_path: &Path) -> Result<Self> {
        load_config(config_path)
    }

    /// Parse custom rules from config
    pub fn parse_rules(&self) -> Result<Vec<ConfiguredRule>> {
        let mut rules = Vec::new();
        for (index, rule_config) in self.rules.iter().enumerate() {
            let rule = ConfiguredRule::try_from(rule_config.clone())
                .with_context(|| format!("Failed to compile rule #{}", index + 1))?;
            rules.push(rule);
        }
        Ok(rules)
    }

    /// Custom rules, base overrides and query var mappings as extensions.
    pub fn extensions(&self) -> Result<Extensions> {
        let mut extensions = Extensions::new();

        for rule in self.parse_rules()? {
            let spec = rule.spec;
            extensions = extensions.with_rules(rule.stage, move |rules| rules.push(spec.clone()));
        }

        if !self.bases.is_empty() {
            let overrides = self.bases.clone();
            extensions = extensions.with_base_override(move |bases| {
                for (name, alternatives) in &overrides {
                    bases.set(name, alternatives.clone());
                }
            });
        }

        if !self.query_vars.is_empty() {
            let mappings = self.query_vars.clone();
            extensions = extensions.with_query_var_map_filter(move |map| {
                for (base, query_var) in &mappings {
                    map.insert(base, query_var);
                }
            });
        }

        Ok(extensions)
    }

    pub fn translation_loader(&self) -> TranslationLoader {
        self.i18n.translation_loader(self.base_dir.as_deref())
    }

    pub fn build_rewriter(&self) -> Result<Rewriter> {
        self.build_rewriter_with(Extensions::new())
    }

    /// Like [`build_rewriter`](Self::build_rewriter), with programmatic
    /// extensions registered ahead of the configured ones.
    pub fn build_rewriter_with(&self, extensions: Extensions) -> Result<Rewriter> {
        let configured = self.extensions()?;
        let mut merged = extensions;
        merged.early_rules.extend(configured.early_rules);
        merged.late_rules.extend(configured.late_rules);
        merged.base_overrides_raw.extend(configured.base_overrides_raw);
        merged
            .query_var_map_filters
            .extend(configured.query_var_map_filters);

        let rewriter = Rewriter::new(
            self.site.clone(),
            self.translation_loader(),
            self.options.clone(),
            merged,
        )
        .with_taxonomy(Arc::new(TermTable::from_config(&self.taxonomies)));

        // Unknown bases only show up once the table is compiled.
        rewriter
            .generate()
            .context("Failed to compile rewrite rules")?;

        if self.flush_on_start {
            rewriter.activate();
        }
        Ok(rewriter)
    }
}
