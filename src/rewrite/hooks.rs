//! Extension points, as an explicit ordered registry of plain functions.
//!
//! Every list runs in registration order. Configuration-declared rules and
//! overrides are installed here as well (see `Config::build_rewriter`).

use super::bases::BaseSlugs;
use super::builder::RuleList;
use super::compiled::RuleTable;
use super::dynamic::DynamicMatchers;
use super::links::Post;
use super::matchers::QueryVarMap;
use super::spec::RuleSpec;
use super::QueryVars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub type RuleListHook = Arc<dyn Fn(RuleList) -> RuleList + Send + Sync>;
pub type SpecTransformer = Arc<dyn Fn(RuleSpec) -> RuleSpec + Send + Sync>;
pub type TableFilter = Arc<dyn Fn(RuleTable) -> RuleTable + Send + Sync>;
pub type BaseOverride = Arc<dyn Fn(&mut BaseSlugs) + Send + Sync>;
pub type RegexBaseOverride = Arc<dyn Fn(&mut BTreeMap<String, String>) + Send + Sync>;
pub type QueryVarMapFilter = Arc<dyn Fn(&mut QueryVarMap) + Send + Sync>;
pub type DynamicMatcherHook = Arc<dyn Fn(&QueryVars, &mut DynamicMatchers) + Send + Sync>;
pub type PermalinkFilter = Arc<dyn Fn(String, &Post) -> String + Send + Sync>;

/// Where injected rules land relative to the core catalogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStage {
    /// Before the core rules, so they take precedence.
    Early,
    #[default]
    Late,
}

#[derive(Clone, Default)]
pub struct Extensions {
    pub early_rules: Vec<RuleListHook>,
    pub late_rules: Vec<RuleListHook>,
    pub spec_transformers: Vec<SpecTransformer>,
    pub table_filters: Vec<TableFilter>,
    pub base_overrides_raw: Vec<BaseOverride>,
    pub base_overrides_final: Vec<RegexBaseOverride>,
    pub query_var_map_filters: Vec<QueryVarMapFilter>,
    pub dynamic_matchers: Vec<DynamicMatcherHook>,
    pub post_type_link_filters: Vec<PermalinkFilter>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules<F>(mut self, stage: RuleStage, hook: F) -> Self
    where
        F: Fn(RuleList) -> RuleList + Send + Sync + 'static,
    {
        match stage {
            RuleStage::Early => self.early_rules.push(Arc::new(hook)),
            RuleStage::Late => self.late_rules.push(Arc::new(hook)),
        }
        self
    }

    pub fn with_spec_transformer<F>(mut self, transform: F) -> Self
    where
        F: Fn(RuleSpec) -> RuleSpec + Send + Sync + 'static,
    {
        self.spec_transformers.push(Arc::new(transform));
        self
    }

    pub fn with_table_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(RuleTable) -> RuleTable + Send + Sync + 'static,
    {
        self.table_filters.push(Arc::new(filter));
        self
    }

    pub fn with_base_override<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut BaseSlugs) + Send + Sync + 'static,
    {
        self.base_overrides_raw.push(Arc::new(hook));
        self
    }

    pub fn with_regex_base_override<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut BTreeMap<String, String>) + Send + Sync + 'static,
    {
        self.base_overrides_final.push(Arc::new(hook));
        self
    }

    pub fn with_query_var_map_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&mut QueryVarMap) + Send + Sync + 'static,
    {
        self.query_var_map_filters.push(Arc::new(filter));
        self
    }

    pub fn with_dynamic_matchers<F>(mut self, hook: F) -> Self
    where
        F: Fn(&QueryVars, &mut DynamicMatchers) + Send + Sync + 'static,
    {
        self.dynamic_matchers.push(Arc::new(hook));
        self
    }

    pub fn with_post_type_link_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(String, &Post) -> String + Send + Sync + 'static,
    {
        self.post_type_link_filters.push(Arc::new(filter));
        self
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("early_rules", &self.early_rules.len())
            .field("late_rules", &self.late_rules.len())
            .field("spec_transformers", &self.spec_transformers.len())
            .field("table_filters", &self.table_filters.len())
            .field("base_overrides_raw", &self.base_overrides_raw.len())
            .field("base_overrides_final", &self.base_overrides_final.len())
            .field("query_var_map_filters", &self.query_var_map_filters.len())
            .field("dynamic_matchers", &self.dynamic_matchers.len())
            .field("post_type_link_filters", &self.post_type_link_filters.len())
            .finish()
    }
}
