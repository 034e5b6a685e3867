use super::bases::ResolvedBases;
use super::spec::{QueryValue, RuleKind, RuleSpec, Segment};
use super::QueryVars;
use crate::error::{RewriteError, RewriteResult};
use regex::Regex;
use serde::Serialize;

/// Host dispatcher entry point the query strings are rendered against.
pub const INDEX: &str = "index.php";

/// A rule spec with its bases substituted and its regex built.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub kind: RuleKind,
    /// Regex text of every path segment, in order.
    pub segments: Vec<String>,
    /// Segments joined by `/`, with an optional trailing slash.
    pub source: String,
    pub regex: Regex,
    pub query: Vec<(String, QueryValue)>,
}

impl PartialEq for CompiledRule {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.source == other.source && self.query == other.query
    }
}

impl CompiledRule {
    pub fn compile(spec: &RuleSpec, bases: &ResolvedBases) -> RewriteResult<Self> {
        let mut segments = Vec::with_capacity(spec.segments.len());
        for segment in &spec.segments {
            let text = match segment {
                Segment::Base(name) => bases
                    .regex(name)
                    .ok_or_else(|| RewriteError::UnknownBase(name.clone()))?
                    .to_string(),
                Segment::Literal(text) => regex::escape(text),
                Segment::Pattern(pattern) => substitute_bases(pattern, bases),
            };
            if !text.is_empty() {
                segments.push(text);
            }
        }

        let source = if segments.is_empty() {
            "/?$".to_string()
        } else {
            format!("{}/?$", segments.join("/"))
        };
        let anchored = format!("^{}", source);
        let regex = Regex::new(&anchored).map_err(|source| RewriteError::InvalidPattern {
            pattern: anchored.clone(),
            source,
        })?;

        Ok(Self {
            kind: spec.kind,
            segments,
            source,
            regex,
            query: spec.query.clone(),
        })
    }

    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    pub fn max_backreference(&self) -> usize {
        self.query
            .iter()
            .filter_map(|(_, value)| match value {
                QueryValue::Capture(index) => Some(*index),
                QueryValue::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// `index.php?key=value&key2=$matches[1]`
    pub fn query_string(&self) -> String {
        let pairs: Vec<String> = self
            .query
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        if pairs.is_empty() {
            INDEX.to_string()
        } else {
            format!("{}?{}", INDEX, pairs.join("&"))
        }
    }

    /// Match a slash-trimmed path; captured groups that did not take part in
    /// the match expand to empty strings.
    pub fn apply(&self, path: &str) -> Option<QueryVars> {
        let captures = self.regex.captures(path)?;

        let vars = self
            .query
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    QueryValue::Literal(text) => text.clone(),
                    QueryValue::Capture(index) => captures
                        .get(*index)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                };
                (key.clone(), value)
            })
            .collect();
        Some(vars)
    }
}

/// Replace `{{ name }}` / `{{name}}` placeholders embedded in raw patterns.
fn substitute_bases(pattern: &str, bases: &ResolvedBases) -> String {
    if !pattern.contains("{{") {
        return pattern.to_string();
    }

    let mut result = pattern.to_string();
    for (name, regex) in &bases.regex {
        result = result
            .replace(&format!("{{{{ {} }}}}", name), regex)
            .replace(&format!("{{{{{}}}}}", name), regex);
    }
    result
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleRow {
    pub regex: String,
    pub query: String,
    pub kind: &'static str,
}

/// The ordered output handed to the host dispatcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<CompiledRule>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn push(&mut self, rule: CompiledRule) {
        self.rules.push(rule);
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&CompiledRule) -> bool,
    {
        self.rules.retain(keep);
    }

    /// First rule matching `path`, with its expanded query vars.
    pub fn find_match(&self, path: &str) -> Option<(&CompiledRule, QueryVars)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(path).map(|vars| (rule, vars)))
    }

    /// `regex => query` lines, the same shape the host stores.
    pub fn lines(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|rule| format!("{} => {}", rule.source, rule.query_string()))
            .collect()
    }

    pub fn rows(&self) -> Vec<RuleRow> {
        self.rules
            .iter()
            .map(|rule| RuleRow {
                regex: rule.source.clone(),
                query: rule.query_string(),
                kind: rule.kind.as_str(),
            })
            .collect()
    }

    /// md5 over the rendered lines; equal tables share a fingerprint.
    pub fn fingerprint(&self) -> String {
        format!("{:x}", md5::compute(self.lines().join("\n")))
    }
}

impl IntoIterator for RuleTable {
    type Item = CompiledRule;
    type IntoIter = std::vec::IntoIter<CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::bases::BaseSlugs;
    use crate::rewrite::builder::RuleList;

    fn english_bases() -> ResolvedBases {
        let mut slugs = BaseSlugs::new();
        slugs.set("archive", ["events"]);
        slugs.set("page", ["page"]);
        slugs.set("list", ["list", "liste"]);
        slugs.set("tax", ["category"]);
        ResolvedBases {
            locale: "en_US".to_string(),
            regex: slugs.to_regex_map(),
            slugs,
        }
    }

    fn compile_first(list: RuleList) -> CompiledRule {
        let spec = list.into_specs().remove(0);
        CompiledRule::compile(&spec, &english_bases()).unwrap()
    }

    #[test]
    fn test_compile_archive_rule() {
        let rule = compile_first(RuleList::new().archive(
            &["{{ list }}", "{{ page }}", r"(\d+)"],
            &[("eventDisplay", "list"), ("paged", "%1")],
        ));

        assert_eq!(rule.source, r"(?:events)/(?:list|liste)/(?:page)/(\d+)/?$");
        assert_eq!(
            rule.query_string(),
            "index.php?post_type=tribe_events&eventDisplay=list&paged=$matches[1]"
        );
        assert_eq!(rule.capture_count(), 1);
        assert_eq!(rule.max_backreference(), 1);
    }

    #[test]
    fn test_apply_expands_captures() {
        let rule = compile_first(RuleList::new().archive(
            &["{{ page }}", r"(\d+)"],
            &[("eventDisplay", "list"), ("paged", "%1")],
        ));

        let vars = rule.apply("events/page/3").unwrap();
        assert_eq!(vars["paged"], "3");
        assert_eq!(vars["eventDisplay"], "list");
        assert_eq!(vars["post_type"], "tribe_events");

        assert!(rule.apply("events/page/3/").is_some());
        assert!(rule.apply("events/page/x").is_none());
        assert!(rule.apply("prefix/events/page/3").is_none());
    }

    #[test]
    fn test_literal_segments_are_escaped() {
        let rule = compile_first(RuleList::new().archive(&["ical"], &[("ical", "1")]));
        assert_eq!(rule.source, "(?:events)/ical/?$");

        let spec = RuleSpec::new(
            RuleKind::Custom,
            vec![Segment::literal("a.b")],
            vec![],
        );
        let rule = CompiledRule::compile(&spec, &english_bases()).unwrap();
        assert!(rule.apply("a.b").is_some());
        assert!(rule.apply("axb").is_none());
        assert_eq!(rule.query_string(), "index.php");
    }

    #[test]
    fn test_unknown_base_is_an_error() {
        let spec = RuleList::new()
            .archive(&["{{ nope }}"], &[])
            .into_specs()
            .remove(0);
        assert!(matches!(
            CompiledRule::compile(&spec, &english_bases()),
            Err(RewriteError::UnknownBase(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_bases_inside_patterns() {
        let spec = RuleSpec::new(
            RuleKind::Custom,
            vec![Segment::pattern("{{archive}}-(\\d+)")],
            vec![("year".to_string(), QueryValue::Capture(1))],
        );
        let rule = CompiledRule::compile(&spec, &english_bases()).unwrap();
        assert_eq!(rule.source, r"(?:events)-(\d+)/?$");
        assert_eq!(rule.apply("events-2024").unwrap()["year"], "2024");
    }

    #[test]
    fn test_table_fingerprint_and_first_match() {
        let list = RuleList::new()
            .archive(&["{{ list }}"], &[("eventDisplay", "list")])
            .archive(&[], &[("eventDisplay", "default")]);
        let bases = english_bases();
        let compile = |list: &RuleList| {
            RuleTable::new(
                list.iter()
                    .map(|spec| CompiledRule::compile(spec, &bases).unwrap())
                    .collect(),
            )
        };

        let table = compile(&list);
        assert_eq!(table.fingerprint(), compile(&list).fingerprint());
        assert_eq!(table.fingerprint().len(), 32);

        let (rule, vars) = table.find_match("events/liste").unwrap();
        assert_eq!(rule.source, "(?:events)/(?:list|liste)/?$");
        assert_eq!(vars["eventDisplay"], "list");
        assert_eq!(table.find_match("events").unwrap().1["eventDisplay"], "default");
        assert!(table.find_match("venues").is_none());
        assert_eq!(table.rows()[1].kind, "archive");
    }
}
