//! Outbound links: rebuilding a pretty path from query variables.

use super::compiled::CompiledRule;
use super::dynamic::DynamicMatchers;
use super::matchers::{alternatives_from_regex, unescape, LocalizedMatchers, Matcher};
use super::spec::QueryValue;
use super::{QueryVars, EVENT_POST_TYPE, ORGANIZER_POST_TYPE, VENUE_POST_TYPE};
use regex::Regex;
use std::collections::BTreeSet;

/// Stands in for `%` inside generated permalinks until the host is done
/// with them.
pub const PERCENT_PLACEHOLDER: &str = "~~TRIBE~PC~~";

pub const SUPPORTED_POST_TYPES: [&str; 3] = [EVENT_POST_TYPE, VENUE_POST_TYPE, ORGANIZER_POST_TYPE];

/// The few post fields links are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub post_type: String,
    pub name: String,
}

impl Post {
    pub fn new(post_type: &str, name: &str) -> Self {
        Self {
            post_type: post_type.to_string(),
            name: name.to_string(),
        }
    }

    pub fn event(name: &str) -> Self {
        Self::new(EVENT_POST_TYPE, name)
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_POST_TYPES.contains(&self.post_type.as_str())
    }
}

pub fn decode_percent_placeholder(permalink: &str) -> String {
    permalink.replace(PERCENT_PLACEHOLDER, "%")
}

/// Whether `rule` could have produced `vars`: same keys, same literal
/// values. Captured values are checked while walking the segments.
pub fn rule_accepts(rule: &CompiledRule, vars: &QueryVars) -> bool {
    let rule_keys: BTreeSet<&str> = rule.query.iter().map(|(key, _)| key.as_str()).collect();
    let var_keys: BTreeSet<&str> = vars.keys().map(String::as_str).collect();
    if rule_keys != var_keys {
        return false;
    }

    rule.query.iter().all(|(key, value)| match value {
        QueryValue::Literal(literal) => vars.get(key) == Some(literal),
        QueryValue::Capture(_) => true,
    })
}

/// Rebuild the path `rule` would match for `vars`, without slashes at
/// either end. `None` when some segment cannot be filled in.
pub fn reverse_path(
    rule: &CompiledRule,
    vars: &QueryVars,
    matchers: &LocalizedMatchers,
    dynamic: &DynamicMatchers,
) -> Option<String> {
    let segments = &rule.segments;
    let mut parts: Vec<String> = Vec::with_capacity(segments.len());
    let mut group = 1;
    let mut index = 0;

    'segments: while index < segments.len() {
        if !dynamic.is_empty() {
            for end in (index + 1..=segments.len()).rev() {
                let run = segments[index..end].join("/");
                if let Some(value) = dynamic.get(&run) {
                    parts.push(value.to_string());
                    group += capture_count(&run)?;
                    index = end;
                    continue 'segments;
                }
            }
        }

        let segment = &segments[index];
        let groups = capture_count(segment)?;
        let part = match matchers.get(segment) {
            Some(Matcher::Localized(matcher)) if groups == 0 => matcher.localized_slug.clone(),
            Some(Matcher::QueryVar(var)) => captured_value(segment, vars.get(var)?)?,
            _ => match groups {
                0 => literal_text(segment).or_else(|| base_text(segment))?,
                1 => {
                    let var = capture_var(rule, group)?;
                    captured_value(segment, vars.get(var)?)?
                }
                _ => return None,
            },
        };

        parts.push(part);
        group += groups;
        index += 1;
    }

    Some(parts.join("/"))
}

/// `home/path/`, or `home/` for an empty path.
pub fn join_url(home: &str, path: &str) -> String {
    let home = home.trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("{}/", home)
    } else {
        format!("{}/{}/", home, path)
    }
}

fn capture_count(regex: &str) -> Option<usize> {
    Regex::new(regex).ok().map(|regex| regex.captures_len() - 1)
}

fn capture_var(rule: &CompiledRule, group: usize) -> Option<&str> {
    rule.query
        .iter()
        .find(|(_, value)| *value == QueryValue::Capture(group))
        .map(|(key, _)| key.as_str())
}

/// `value` if the segment regex accepts all of it.
fn captured_value(segment: &str, value: &str) -> Option<String> {
    let anchored = Regex::new(&format!("^(?:{})$", segment)).ok()?;
    anchored.is_match(value).then(|| value.to_string())
}

/// Localized text of a base segment no matcher claims (e.g. `page`).
fn base_text(segment: &str) -> Option<String> {
    alternatives_from_regex(segment)?.pop()
}

/// The text an escaped literal segment matches; `None` for real patterns.
fn literal_text(segment: &str) -> Option<String> {
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' => {
                return None
            }
            _ => {}
        }
    }
    Some(unescape(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::bases::{BaseSlugs, ResolvedBases};
    use crate::rewrite::builder::RuleList;
    use crate::rewrite::matchers::QueryVarMap;
    use crate::rewrite::options::SiteOptions;

    fn bases() -> ResolvedBases {
        let mut slugs = BaseSlugs::new();
        slugs.set("archive", ["events", "veranstaltungen"]);
        slugs.set("tax", ["category", "kategorie"]);
        slugs.set("list", ["list", "liste"]);
        slugs.set("page", ["page"]);
        ResolvedBases {
            locale: "de_DE".to_string(),
            regex: slugs.to_regex_map(),
            slugs,
        }
    }

    fn compile(list: RuleList) -> CompiledRule {
        CompiledRule::compile(&list.into_specs().remove(0), &bases()).unwrap()
    }

    fn vars(pairs: &[(&str, &str)]) -> QueryVars {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn matchers() -> LocalizedMatchers {
        LocalizedMatchers::build(&bases(), &QueryVarMap::default(), &SiteOptions::new())
    }

    #[test]
    fn test_post_support_and_placeholder() {
        assert!(Post::event("party").is_supported());
        assert!(Post::new("tribe_venue", "hall").is_supported());
        assert!(!Post::new("page", "about").is_supported());
        assert_eq!(
            decode_percent_placeholder("http://x/event/caf~~TRIBE~PC~~c3~~TRIBE~PC~~a9/"),
            "http://x/event/caf%c3%a9/"
        );
    }

    #[test]
    fn test_rule_accepts_keys_and_literals() {
        let rule = compile(RuleList::new().archive(&["{{ list }}"], &[("eventDisplay", "list")]));

        assert!(rule_accepts(
            &rule,
            &vars(&[("post_type", "tribe_events"), ("eventDisplay", "list")])
        ));
        assert!(!rule_accepts(
            &rule,
            &vars(&[("post_type", "tribe_events"), ("eventDisplay", "month")])
        ));
        assert!(!rule_accepts(&rule, &vars(&[("post_type", "tribe_events")])));
    }

    #[test]
    fn test_reverse_path_uses_localized_slugs_and_captures() {
        let rule = compile(RuleList::new().tax(
            &["{{ list }}", "{{ page }}", r"(\d+)"],
            &[("eventDisplay", "list"), ("paged", "%2")],
        ));
        let query = vars(&[
            ("post_type", "tribe_events"),
            ("tribe_events_cat", "music"),
            ("eventDisplay", "list"),
            ("paged", "2"),
        ]);

        let path = reverse_path(&rule, &query, &matchers(), &DynamicMatchers::new()).unwrap();
        assert_eq!(path, "veranstaltungen/kategorie/music/liste/page/2");

        let mut bad_page = query.clone();
        bad_page.insert("paged".to_string(), "two".to_string());
        assert!(reverse_path(&rule, &bad_page, &matchers(), &DynamicMatchers::new()).is_none());
    }

    #[test]
    fn test_reverse_path_prefers_dynamic_matchers() {
        let rule = compile(RuleList::new().tax(&[], &[("eventDisplay", "default")]));
        let mut dynamic = DynamicMatchers::new();
        dynamic.insert(
            "(?:category|kategorie)/(?:[^/]+/)*([^/]+)",
            "kategorie/arts/music",
        );
        let query = vars(&[
            ("post_type", "tribe_events"),
            ("tribe_events_cat", "music"),
            ("eventDisplay", "default"),
        ]);

        assert_eq!(
            reverse_path(&rule, &query, &matchers(), &dynamic).unwrap(),
            "veranstaltungen/kategorie/arts/music"
        );
    }

    #[test]
    fn test_reverse_path_date_and_literal() {
        let rule = compile(RuleList::new().archive(
            &[r"(\d{4}-\d{2}-\d{2})", "ical"],
            &[("ical", "1"), ("eventDisplay", "day"), ("eventDate", "%1")],
        ));
        let query = vars(&[
            ("post_type", "tribe_events"),
            ("ical", "1"),
            ("eventDisplay", "day"),
            ("eventDate", "2024-05-01"),
        ]);
        assert_eq!(
            reverse_path(&rule, &query, &matchers(), &DynamicMatchers::new()).unwrap(),
            "veranstaltungen/2024-05-01/ical"
        );

        let mut month = query.clone();
        month.insert("eventDate".to_string(), "2024-05".to_string());
        assert!(reverse_path(&rule, &month, &matchers(), &DynamicMatchers::new()).is_none());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://example.com/", "events/list"), "http://example.com/events/list/");
        assert_eq!(join_url("http://example.com", ""), "http://example.com/");
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(literal_text(r"a\.b").as_deref(), Some("a.b"));
        assert_eq!(literal_text("ical").as_deref(), Some("ical"));
        assert!(literal_text("(?:x)").is_none());
    }
}
