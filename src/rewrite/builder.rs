use super::spec::{QueryValue, RuleKind, RuleSpec, Segment};
use super::{EVENT_POST_TYPE, SINGLE_NAME_PATTERN, TAG_TERM_PATTERN, TAX_HIERARCHY_PATTERN};
use crate::taxonomy::EVENT_CATEGORY;

/// Ordered rule specs. Every method consumes the list and returns the
/// extended one, so callers always own the value they build.
///
/// Order is precedence: the first spec whose regex matches a URL wins.
/// Identical specs are not collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleList {
    specs: Vec<RuleSpec>,
}

impl RuleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single event rule: `{{ single }}/<name>/...`.
    pub fn single(self, segments: &[&str], query: &[(&str, &str)]) -> Self {
        self.kind(RuleKind::Single, segments, query)
    }

    /// Event archive rule: `{{ archive }}/...`.
    pub fn archive(self, segments: &[&str], query: &[(&str, &str)]) -> Self {
        self.kind(RuleKind::Archive, segments, query)
    }

    /// Event category rule: `{{ archive }}/{{ tax }}/<term path>/...`.
    pub fn tax(self, segments: &[&str], query: &[(&str, &str)]) -> Self {
        self.kind(RuleKind::Tax, segments, query)
    }

    /// Tag rule: `{{ archive }}/{{ tag }}/<tag>/...`.
    pub fn tag(self, segments: &[&str], query: &[(&str, &str)]) -> Self {
        self.kind(RuleKind::Tag, segments, query)
    }

    fn kind(self, kind: RuleKind, segments: &[&str], query: &[(&str, &str)]) -> Self {
        let segments = segments.iter().map(|text| Segment::parse(text)).collect();
        let query = query
            .iter()
            .map(|(key, value)| (key.to_string(), QueryValue::parse(value)))
            .collect();
        self.add(kind, segments, query)
    }

    /// Prepend the kind's prefix, merge its query defaults and append.
    pub fn add(
        mut self,
        kind: RuleKind,
        segments: Vec<Segment>,
        query: Vec<(String, QueryValue)>,
    ) -> Self {
        self.specs.push(assemble(kind, segments, query));
        self
    }

    /// Append an already assembled spec as-is.
    pub fn push(mut self, spec: RuleSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn extend(mut self, other: RuleList) -> Self {
        self.specs.extend(other.specs);
        self
    }

    pub fn map<F>(self, transform: F) -> Self
    where
        F: Fn(RuleSpec) -> RuleSpec,
    {
        Self {
            specs: self.specs.into_iter().map(transform).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleSpec> {
        self.specs.iter()
    }

    pub fn into_specs(self) -> Vec<RuleSpec> {
        self.specs
    }
}

impl FromIterator<RuleSpec> for RuleList {
    fn from_iter<I: IntoIterator<Item = RuleSpec>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}

/// A spec of `kind` with its prefix and query defaults applied.
pub fn assemble(
    kind: RuleKind,
    segments: Vec<Segment>,
    query: Vec<(String, QueryValue)>,
) -> RuleSpec {
    let mut full_segments = kind_prefix(kind);
    full_segments.extend(segments);
    RuleSpec::new(kind, full_segments, merge_query(kind_defaults(kind), query))
}

pub fn kind_prefix(kind: RuleKind) -> Vec<Segment> {
    match kind {
        RuleKind::Single => vec![
            Segment::base("single"),
            Segment::pattern(SINGLE_NAME_PATTERN),
        ],
        RuleKind::Archive => vec![Segment::base("archive")],
        RuleKind::Tax => vec![
            Segment::base("archive"),
            Segment::base("tax"),
            Segment::pattern(TAX_HIERARCHY_PATTERN),
        ],
        RuleKind::Tag => vec![
            Segment::base("archive"),
            Segment::base("tag"),
            Segment::pattern(TAG_TERM_PATTERN),
        ],
        RuleKind::Custom => Vec::new(),
    }
}

pub fn kind_defaults(kind: RuleKind) -> Vec<(String, QueryValue)> {
    let post_type = ("post_type".to_string(), QueryValue::parse(EVENT_POST_TYPE));
    match kind {
        RuleKind::Single | RuleKind::Custom => Vec::new(),
        RuleKind::Archive => vec![post_type],
        RuleKind::Tax => vec![
            post_type,
            (EVENT_CATEGORY.to_string(), QueryValue::Capture(1)),
        ],
        RuleKind::Tag => vec![post_type, ("tag".to_string(), QueryValue::Capture(1))],
    }
}

/// Defaults keep their position (with overridden values), new keys follow in
/// caller order, falsy values are dropped.
pub fn merge_query(
    defaults: Vec<(String, QueryValue)>,
    args: Vec<(String, QueryValue)>,
) -> Vec<(String, QueryValue)> {
    let mut merged = defaults;
    for (key, value) in args {
        match merged.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged.retain(|(_, value)| !value.is_falsy());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(spec: &RuleSpec) -> Vec<&str> {
        spec.query.iter().map(|(key, _)| key.as_str()).collect()
    }

    #[test]
    fn test_archive_prepends_base_and_post_type() {
        let list = RuleList::new().archive(
            &["{{ page }}", r"(\d+)"],
            &[("eventDisplay", "list"), ("paged", "%1")],
        );
        let spec = list.iter().next().unwrap();

        assert_eq!(
            spec.segments,
            vec![
                Segment::base("archive"),
                Segment::base("page"),
                Segment::pattern(r"(\d+)")
            ]
        );
        assert_eq!(keys(spec), vec!["post_type", "eventDisplay", "paged"]);
        assert_eq!(spec.query_value("paged"), Some(&QueryValue::Capture(1)));
    }

    #[test]
    fn test_tax_prefix_and_defaults() {
        let list = RuleList::new().tax(&["{{ list }}"], &[("eventDisplay", "list")]);
        let spec = list.iter().next().unwrap();

        assert_eq!(spec.segments.len(), 4);
        assert_eq!(spec.segments[2], Segment::pattern(TAX_HIERARCHY_PATTERN));
        assert_eq!(keys(spec), vec!["post_type", EVENT_CATEGORY, "eventDisplay"]);
        assert_eq!(spec.capture_count().unwrap(), 1);
    }

    #[test]
    fn test_single_has_no_defaults() {
        let list = RuleList::new().single(
            &["ical"],
            &[("ical", "1"), ("name", "%1"), ("post_type", EVENT_POST_TYPE)],
        );
        let spec = list.iter().next().unwrap();
        assert_eq!(spec.segments[0], Segment::base("single"));
        assert_eq!(keys(spec), vec!["ical", "name", "post_type"]);
    }

    #[test]
    fn test_merge_overrides_in_place_and_drops_falsy() {
        let merged = merge_query(
            vec![
                ("post_type".to_string(), QueryValue::parse("tribe_events")),
                ("tag".to_string(), QueryValue::Capture(1)),
            ],
            vec![
                ("featured".to_string(), QueryValue::from(true)),
                ("post_type".to_string(), QueryValue::parse("tribe_venue")),
                ("tag".to_string(), QueryValue::from(false)),
            ],
        );
        assert_eq!(
            merged,
            vec![
                ("post_type".to_string(), QueryValue::parse("tribe_venue")),
                ("featured".to_string(), QueryValue::parse("1")),
            ]
        );
    }

    #[test]
    fn test_calls_accumulate_without_dedup() {
        let list = RuleList::new()
            .archive(&["{{ list }}"], &[("eventDisplay", "list")])
            .archive(&["{{ list }}"], &[("eventDisplay", "list")]);
        assert_eq!(list.len(), 2);

        let other = RuleList::new().tag(&[], &[("eventDisplay", "default")]);
        let combined = list.extend(other);
        assert_eq!(combined.len(), 3);
        assert_eq!(combined.iter().last().unwrap().kind, RuleKind::Tag);
    }

    #[test]
    fn test_map_transforms_every_spec() {
        let list = RuleList::new()
            .archive(&["{{ list }}"], &[("eventDisplay", "list")])
            .map(|mut spec| {
                spec.query.push(("lang".to_string(), QueryValue::parse("de")));
                spec
            });
        assert_eq!(
            list.iter().next().unwrap().query_value("lang"),
            Some(&QueryValue::parse("de"))
        );
    }
}
