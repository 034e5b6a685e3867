use crate::error::{RewriteError, RewriteResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const REGEX_META: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$',
];

/// One path segment of a rule, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Reference to a localized base slug (`{{ month }}`).
    Base(String),
    /// Fixed text, escaped when compiled.
    Literal(String),
    /// Raw regular expression, possibly capturing.
    Pattern(String),
}

impl Segment {
    pub fn base(name: &str) -> Self {
        Segment::Base(name.to_string())
    }

    pub fn literal(text: &str) -> Self {
        Segment::Literal(text.to_string())
    }

    pub fn pattern(regex: &str) -> Self {
        Segment::Pattern(regex.to_string())
    }

    /// Classify catalogue text: `{{ name }}` and `{{name}}` are base
    /// references, anything holding a regex metacharacter is a pattern.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(inner) = trimmed
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
        {
            return Segment::Base(inner.trim().to_string());
        }

        if text.contains(REGEX_META) {
            Segment::Pattern(text.to_string())
        } else {
            Segment::Literal(text.to_string())
        }
    }

    /// Capturing groups this segment contributes.
    pub fn capture_count(&self) -> RewriteResult<usize> {
        match self {
            Segment::Base(_) | Segment::Literal(_) => Ok(0),
            Segment::Pattern(pattern) => {
                let regex = Regex::new(pattern).map_err(|source| RewriteError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                Ok(regex.captures_len() - 1)
            }
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Base(name) => write!(f, "{{{{ {} }}}}", name),
            Segment::Literal(text) | Segment::Pattern(text) => write!(f, "{}", text),
        }
    }
}

/// Value side of a rule's query template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Literal(String),
    /// 1-based back-reference to a capture group (`%1`).
    Capture(usize),
}

impl QueryValue {
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix('%') {
            Some(index) if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) => {
                match index.parse() {
                    Ok(n) => QueryValue::Capture(n),
                    Err(_) => QueryValue::Literal(text.to_string()),
                }
            }
            _ => QueryValue::Literal(text.to_string()),
        }
    }

    /// Empty and zero literals are dropped when query defaults are merged.
    pub fn is_falsy(&self) -> bool {
        matches!(self, QueryValue::Literal(value) if value.is_empty() || value == "0")
    }
}

impl From<&str> for QueryValue {
    fn from(text: &str) -> Self {
        QueryValue::parse(text)
    }
}

impl From<bool> for QueryValue {
    fn from(flag: bool) -> Self {
        QueryValue::Literal(if flag { "1" } else { "" }.to_string())
    }
}

impl From<u32> for QueryValue {
    fn from(number: u32) -> Self {
        QueryValue::Literal(number.to_string())
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Literal(value) => write!(f, "{}", value),
            QueryValue::Capture(index) => write!(f, "$matches[{}]", index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Single,
    Archive,
    Tax,
    Tag,
    Custom,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Single => "single",
            RuleKind::Archive => "archive",
            RuleKind::Tax => "tax",
            RuleKind::Tag => "tag",
            RuleKind::Custom => "custom",
        }
    }
}

impl FromStr for RuleKind {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(RuleKind::Single),
            "archive" => Ok(RuleKind::Archive),
            "tax" => Ok(RuleKind::Tax),
            "tag" => Ok(RuleKind::Tag),
            "custom" => Ok(RuleKind::Custom),
            other => Err(RewriteError::InvalidRuleKind(other.to_string())),
        }
    }
}

/// Ordered segments plus the query variables they map to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub kind: RuleKind,
    pub segments: Vec<Segment>,
    pub query: Vec<(String, QueryValue)>,
}

impl RuleSpec {
    pub fn new(kind: RuleKind, segments: Vec<Segment>, query: Vec<(String, QueryValue)>) -> Self {
        Self {
            kind,
            segments,
            query,
        }
    }

    pub fn query_value(&self, name: &str) -> Option<&QueryValue> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Highest `%N` used by the query template, 0 when there is none.
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

    pub fn capture_count(&self) -> RewriteResult<usize> {
        self.segments
            .iter()
            .map(Segment::capture_count)
            .sum::<RewriteResult<usize>>()
    }

    /// Fails when a placeholder points past the available capture groups.
    pub fn validate(&self) -> RewriteResult<()> {
        let groups = self.capture_count()?;
        let placeholder = self.max_backreference();
        if placeholder > groups {
            return Err(RewriteError::DanglingBackreference {
                rule: self.to_string(),
                placeholder,
                groups,
            });
        }
        Ok(())
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .segments
            .iter()
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{}:{}", self.kind.as_str(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_parse() {
        assert_eq!(Segment::parse("{{ page }}"), Segment::base("page"));
        assert_eq!(Segment::parse("{{page}}"), Segment::base("page"));
        assert_eq!(Segment::parse("ical"), Segment::literal("ical"));
        assert_eq!(Segment::parse("(\\d+)"), Segment::pattern("(\\d+)"));
        assert_eq!(
            Segment::parse("(feed|rdf|rss|rss2|atom)"),
            Segment::pattern("(feed|rdf|rss|rss2|atom)")
        );
    }

    #[test]
    fn test_segment_capture_count() {
        assert_eq!(Segment::base("month").capture_count().unwrap(), 0);
        assert_eq!(Segment::pattern("(?:[^/]+/)*([^/]+)").capture_count().unwrap(), 1);
        assert_eq!(Segment::pattern("(a)-(b)").capture_count().unwrap(), 2);
        assert!(Segment::pattern("(unclosed").capture_count().is_err());
    }

    #[test]
    fn test_query_value_parse() {
        assert_eq!(QueryValue::parse("%1"), QueryValue::Capture(1));
        assert_eq!(QueryValue::parse("%12"), QueryValue::Capture(12));
        assert_eq!(QueryValue::parse("%"), QueryValue::Literal("%".to_string()));
        assert_eq!(QueryValue::parse("%x"), QueryValue::Literal("%x".to_string()));
        assert_eq!(QueryValue::from(true), QueryValue::Literal("1".to_string()));
        assert!(QueryValue::from(false).is_falsy());
        assert_eq!(QueryValue::Capture(2).to_string(), "$matches[2]");
    }

    #[test]
    fn test_rule_kind_from_str() {
        assert_eq!("tax".parse::<RuleKind>().unwrap(), RuleKind::Tax);
        assert!("taxonomy".parse::<RuleKind>().is_err());
    }

    #[test]
    fn test_validate_dangling_backreference() {
        let ok = RuleSpec::new(
            RuleKind::Custom,
            vec![Segment::literal("a"), Segment::pattern("(\\d+)")],
            vec![("paged".to_string(), QueryValue::Capture(1))],
        );
        assert!(ok.validate().is_ok());

        let dangling = RuleSpec::new(
            RuleKind::Custom,
            vec![Segment::literal("a"), Segment::pattern("(\\d+)")],
            vec![("paged".to_string(), QueryValue::Capture(2))],
        );
        match dangling.validate() {
            Err(RewriteError::DanglingBackreference {
                placeholder, groups, ..
            }) => {
                assert_eq!(placeholder, 2);
                assert_eq!(groups, 1);
            }
            other => panic!("Expected dangling back-reference, got {:?}", other),
        }
    }
}
