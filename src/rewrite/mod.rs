//! Permalink rewrite rules for the event archive.
//!
//! [`Rewriter`] owns everything a site needs: the locale-keyed caches of
//! base slugs, compiled rule tables and localized matchers, the registered
//! extensions, and the inbound (URL -> query vars) and outbound
//! (query vars -> URL) directions built on top of them.

pub mod bases;
pub mod builder;
pub mod cache;
pub mod catalogue;
pub mod compiled;
pub mod dynamic;
pub mod flush;
pub mod hooks;
pub mod links;
pub mod matchers;
pub mod options;
pub mod request;
pub mod spec;

use crate::config::SiteConfig;
use crate::error::RewriteResult;
use crate::i18n::TranslationLoader;
use crate::taxonomy::{TaxonomyStore, TermTable, EVENT_CATEGORY};
use bases::{BaseResolver, ResolvedBases};
use builder::RuleList;
use cache::LocaleCache;
use compiled::{CompiledRule, RuleTable};
use dynamic::DynamicMatchers;
use flush::{MemoryTransients, TransientStore};
use hooks::Extensions;
use links::Post;
use matchers::{LocalizedMatcher, LocalizedMatchers, QueryVarMap, EVENT_DATE_VAR, EVENT_DISPLAY_VAR};
use options::SiteOptions;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const EVENT_POST_TYPE: &str = "tribe_events";
pub const VENUE_POST_TYPE: &str = "tribe_venue";
pub const ORGANIZER_POST_TYPE: &str = "tribe_organizer";

/// Capture for the single event name.
pub const SINGLE_NAME_PATTERN: &str = "([^/]+)";
/// Capture for a tag slug.
pub const TAG_TERM_PATTERN: &str = "([^/]+)";
/// Open-ended category path; only the leaf term is captured.
pub const TAX_HIERARCHY_PATTERN: &str = "(?:[^/]+/)*([^/]+)";

pub type QueryVars = BTreeMap<String, String>;

/// What an archive link should show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewLink {
    /// `list`, `month`, `day`, ...; `None` for the default view.
    pub display: Option<String>,
    pub date: Option<String>,
    pub featured: bool,
    /// Several categories are joined with commas.
    pub categories: Vec<String>,
    pub page: Option<u32>,
}

impl ViewLink {
    pub fn display(display: &str) -> Self {
        Self {
            display: Some(display.to_string()),
            ..Self::default()
        }
    }

    pub fn query_vars(&self) -> QueryVars {
        let mut vars = QueryVars::new();
        vars.insert("post_type".to_string(), EVENT_POST_TYPE.to_string());
        vars.insert(
            EVENT_DISPLAY_VAR.to_string(),
            self.display.clone().unwrap_or_else(|| "default".to_string()),
        );
        if let Some(date) = &self.date {
            vars.insert(EVENT_DATE_VAR.to_string(), date.clone());
        }
        if self.featured {
            vars.insert("featured".to_string(), "1".to_string());
        }
        if !self.categories.is_empty() {
            vars.insert(EVENT_CATEGORY.to_string(), self.categories.join(","));
        }
        if let Some(page) = self.page {
            vars.insert("paged".to_string(), page.to_string());
        }
        vars
    }
}

#[derive(Clone)]
pub struct Rewriter {
    site: SiteConfig,
    resolver: BaseResolver,
    extensions: Extensions,
    taxonomy: Arc<dyn TaxonomyStore>,
    transients: Arc<dyn TransientStore>,
    tables: LocaleCache<RuleTable>,
    matchers: LocaleCache<LocalizedMatchers>,
}

impl fmt::Debug for Rewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rewriter")
            .field("site", &self.site)
            .field("resolver", &self.resolver)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl Rewriter {
    pub fn new(
        site: SiteConfig,
        loader: TranslationLoader,
        options: SiteOptions,
        extensions: Extensions,
    ) -> Self {
        Self {
            site,
            resolver: BaseResolver::new(loader, options, extensions.clone()),
            extensions,
            taxonomy: Arc::new(TermTable::new()),
            transients: Arc::new(MemoryTransients::new()),
            tables: LocaleCache::new("rule table"),
            matchers: LocaleCache::new("localized matchers"),
        }
    }

    pub fn with_taxonomy(mut self, store: Arc<dyn TaxonomyStore>) -> Self {
        self.taxonomy = store;
        self
    }

    pub fn with_transients(mut self, store: Arc<dyn TransientStore>) -> Self {
        self.transients = store;
        self
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn options(&self) -> &SiteOptions {
        self.resolver.options()
    }

    pub fn locale(&self) -> &str {
        &self.site.locale
    }

    /// Base slugs for the site locale.
    pub fn bases(&self) -> Arc<ResolvedBases> {
        self.resolver
            .resolve(&self.site.locale, self.site.user_locale.as_deref())
    }

    /// Every spec in precedence order: early extensions, the core
    /// catalogue, late extensions, then the rule transformers.
    pub fn rule_specs(&self) -> RuleList {
        let mut rules = RuleList::new();
        for hook in &self.extensions.early_rules {
            rules = hook(rules);
        }
        rules = catalogue::core_rules(rules);
        for hook in &self.extensions.late_rules {
            rules = hook(rules);
        }

        for transform in &self.extensions.spec_transformers {
            rules = rules.map(|spec| transform(spec));
        }
        rules
    }

    /// The compiled table for the site locale, built once per locale.
    pub fn generate(&self) -> RewriteResult<Arc<RuleTable>> {
        self.tables
            .try_get_or_build(&self.site.locale, || self.build_table())
    }

    fn build_table(&self) -> RewriteResult<RuleTable> {
        let bases = self.bases();
        let specs = self.rule_specs();

        let mut table = RuleTable::new(
            specs
                .iter()
                .map(|spec| CompiledRule::compile(spec, &bases))
                .collect::<RewriteResult<Vec<_>>>()?,
        );
        for filter in &self.extensions.table_filters {
            table = filter(table);
        }

        info!(
            "📋 Generated {} rewrite rules for locale {}",
            table.len(),
            self.site.locale
        );
        Ok(table)
    }

    pub fn query_var_map(&self) -> QueryVarMap {
        let mut map = QueryVarMap::default();
        for filter in &self.extensions.query_var_map_filters {
            filter(&mut map);
        }
        map
    }

    pub fn localized_matchers(&self) -> Arc<LocalizedMatchers> {
        self.matchers.get_or_build(&self.site.locale, || {
            LocalizedMatchers::build(&self.bases(), &self.query_var_map(), self.options())
        })
    }

    /// First localized matcher for `query_var`.
    pub fn matcher_for(&self, query_var: &str) -> Option<LocalizedMatcher> {
        self.localized_matchers().matcher_for(query_var).cloned()
    }

    /// Query variable behind a segment regex such as `(?:month)`.
    pub fn query_var_for(&self, matcher: &str) -> Option<String> {
        self.localized_matchers()
            .query_var_for(matcher)
            .map(str::to_string)
    }

    /// Built-in category matchers plus the registered ones.
    pub fn dynamic_matchers(&self, query_vars: &QueryVars) -> DynamicMatchers {
        let mut matchers =
            dynamic::category_matchers(query_vars, &self.bases(), self.taxonomy.as_ref());
        for hook in &self.extensions.dynamic_matchers {
            hook(query_vars, &mut matchers);
        }
        matchers
    }

    /// Query vars for `url`, or `None` when no rule claims it.
    pub fn parse_request(&self, url: &str, extra_query_vars: &QueryVars) -> Option<QueryVars> {
        let table = match self.generate() {
            Ok(table) => table,
            Err(e) => {
                warn!("Cannot parse request, rule generation failed: {}", e);
                return None;
            }
        };

        let (path, _) = request::split_url(url);
        let path = request::relative_path(&path, &request::home_path(&self.site.home));

        let mut query_vars = request::match_path(&table, &path)?;
        for (key, value) in extra_query_vars {
            query_vars
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        Some(request::normalize(query_vars, url))
    }

    /// Pretty URL for `query_vars`, from the first rule that can express
    /// them.
    pub fn canonical_url(&self, query_vars: &QueryVars) -> Option<String> {
        let table = self.generate().ok()?;
        let matchers = self.localized_matchers();
        let dynamic = self.dynamic_matchers(query_vars);

        table
            .iter()
            .filter(|rule| links::rule_accepts(rule, query_vars))
            .find_map(|rule| links::reverse_path(rule, query_vars, &matchers, &dynamic))
            .map(|path| links::join_url(&self.site.home, &path))
    }

    /// Link to an archive view; the archive root when nothing matches.
    pub fn view_link(&self, view: &ViewLink) -> String {
        self.canonical_url(&view.query_vars()).unwrap_or_else(|| {
            debug!("No rule for {:?}, linking the archive root", view);
            self.archive_url()
        })
    }

    pub fn archive_url(&self) -> String {
        let bases = self.bases();
        let archive = bases
            .slug("archive")
            .map(|slug| slug.localized().to_string())
            .unwrap_or_else(|| self.options().events_slug());
        links::join_url(&self.site.home, &archive)
    }

    pub fn event_link(&self, post: &Post) -> String {
        let bases = self.bases();
        let single = bases
            .slug("single")
            .map(|slug| slug.localized().to_string())
            .unwrap_or_else(|| self.options().single_event_slug());
        let permalink = links::join_url(&self.site.home, &format!("{}/{}", single, post.name));
        self.post_type_link(permalink, post)
    }

    /// Decode the percent placeholder and run the link filters for the
    /// calendar's own post types; other posts pass through.
    pub fn post_type_link(&self, permalink: String, post: &Post) -> String {
        if !post.is_supported() {
            return permalink;
        }

        let mut permalink = links::decode_percent_placeholder(&permalink);
        for filter in &self.extensions.post_type_link_filters {
            permalink = filter(permalink, post);
        }
        permalink
    }

    /// `None` when a post lookup must not run for `url`: the archive root
    /// and its month view. Otherwise the URL to look up, query args
    /// stripped under pretty permalinks.
    pub fn url_to_postid_guard(&self, url: &str) -> Option<String> {
        let events_url = self.archive_url();
        let mut url = url.to_string();

        if !self.site.permalink_structure.is_empty() {
            match url.split_once('?') {
                Some((before, query)) if !query.is_empty() => url = before.to_string(),
                _ => {
                    if url.to_lowercase().starts_with(&events_url.to_lowercase()) {
                        url = events_url.clone();
                    }
                }
            }
        }

        let month_url = self.view_link(&ViewLink::display("month"));
        if url == events_url || url == month_url {
            return None;
        }
        Some(url)
    }

    /// The pagination segment: localized for category archives.
    pub fn pagination_base(&self, category_query: bool) -> String {
        if !category_query {
            return "page".to_string();
        }

        let bases = self.bases();
        let page = bases
            .slug("page")
            .map(|slug| slug.localized().to_lowercase())
            .unwrap_or_else(|| "page".to_string());
        urlencoding::encode(&page).into_owned()
    }

    /// Schedule a rebuild for the next served request.
    pub fn activate(&self) {
        flush::schedule_flush(self.transients.as_ref());
    }

    /// Run at the start of each request; returns whether caches were dropped.
    pub fn maybe_delayed_flush(&self) -> bool {
        if !flush::take_scheduled_flush(self.transients.as_ref()) {
            return false;
        }
        info!("🔄 Delayed flush requested, dropping compiled rewrite rules");
        self.flush();
        true
    }

    pub fn flush(&self) {
        self.resolver.clear();
        self.tables.clear();
        self.matchers.clear();
    }
}
