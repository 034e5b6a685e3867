//! The core rule catalogue: every URL shape the event archive answers to.
//!
//! Published links depend on these shapes. Entries may be added, but an
//! existing entry must keep matching what it matched before.

use super::builder::RuleList;
use super::EVENT_POST_TYPE;

const FEEDS: &str = "(feed|rdf|rss|rss2|atom)";
const MONTH_DATE: &str = r"(\d{4}-\d{2})";
const DAY_DATE: &str = r"(\d{4}-\d{2}-\d{2})";
const PAGE_NUMBER: &str = r"(\d+)";

pub fn core_rules(rules: RuleList) -> RuleList {
    let rules = single_rules(rules);
    let rules = archive_rules(rules);
    let rules = tax_rules(rules);
    tag_rules(rules)
}

fn single_rules(rules: RuleList) -> RuleList {
    rules.single(
        &["ical"],
        &[("ical", "1"), ("name", "%1"), ("post_type", EVENT_POST_TYPE)],
    )
}

fn archive_rules(rules: RuleList) -> RuleList {
    rules
        .archive(&["{{ page }}", PAGE_NUMBER], &[("eventDisplay", "list"), ("paged", "%1")])
        .archive(
            &["{{ featured }}", "{{ page }}", PAGE_NUMBER],
            &[("featured", "1"), ("eventDisplay", "list"), ("paged", "%1")],
        )
        .archive(&[FEEDS], &[("eventDisplay", "list"), ("feed", "%1")])
        .archive(
            &["{{ featured }}", FEEDS],
            &[("featured", "1"), ("eventDisplay", "list"), ("feed", "%1")],
        )
        .archive(&["{{ month }}"], &[("eventDisplay", "month")])
        .archive(&["{{ month }}", "{{ featured }}"], &[("eventDisplay", "month"), ("featured", "1")])
        .archive(&["{{ month }}", MONTH_DATE], &[("eventDisplay", "month"), ("eventDate", "%1")])
        .archive(&["{{ list }}", "{{ page }}", PAGE_NUMBER], &[("eventDisplay", "list"), ("paged", "%1")])
        .archive(
            &["{{ list }}", "{{ featured }}", "{{ page }}", PAGE_NUMBER],
            &[("eventDisplay", "list"), ("featured", "1"), ("paged", "%1")],
        )
        .archive(&["{{ list }}"], &[("eventDisplay", "list")])
        .archive(&["{{ list }}", "{{ featured }}"], &[("eventDisplay", "list"), ("featured", "1")])
        .archive(&["{{ today }}"], &[("eventDisplay", "day")])
        .archive(&["{{ today }}", "{{ featured }}"], &[("eventDisplay", "day"), ("featured", "1")])
        .archive(&[MONTH_DATE], &[("eventDisplay", "month"), ("eventDate", "%1")])
        .archive(
            &[MONTH_DATE, "{{ featured }}"],
            &[("eventDisplay", "month"), ("eventDate", "%1"), ("featured", "1")],
        )
        .archive(&[DAY_DATE], &[("eventDisplay", "day"), ("eventDate", "%1")])
        .archive(
            &[DAY_DATE, "{{ featured }}"],
            &[("eventDisplay", "day"), ("eventDate", "%1"), ("featured", "1")],
        )
        .archive(&["{{ featured }}"], &[("featured", "1")])
        .archive(&["{{page}}", PAGE_NUMBER], &[("eventDisplay", "default"), ("paged", "%1")])
        .archive(&[], &[("eventDisplay", "default")])
        .archive(&["ical"], &[("ical", "1")])
        .archive(&["{{ featured }}", "ical"], &[("ical", "1"), ("featured", "1")])
        .archive(
            &[DAY_DATE, "ical"],
            &[("ical", "1"), ("eventDisplay", "day"), ("eventDate", "%1")],
        )
        .archive(
            &[DAY_DATE, "ical", "{{ featured }}"],
            &[("ical", "1"), ("eventDisplay", "day"), ("eventDate", "%1"), ("featured", "1")],
        )
}

// The term capture is open-ended (`parent/child/...`), so it would happily
// swallow a trailing view keyword. Compound suffixes therefore come before
// every shorter suffix they end with.
fn tax_rules(rules: RuleList) -> RuleList {
    rules
        .tax(
            &["{{ list }}", "{{ featured }}", "{{ page }}", PAGE_NUMBER],
            &[("eventDisplay", "list"), ("featured", "1"), ("paged", "%2")],
        )
        .tax(
            &["{{ featured }}", "{{ page }}", PAGE_NUMBER],
            &[("featured", "1"), ("eventDisplay", "list"), ("paged", "%2")],
        )
        .tax(&["{{ list }}", "{{ page }}", PAGE_NUMBER], &[("eventDisplay", "list"), ("paged", "%2")])
        .tax(&["{{ page }}", PAGE_NUMBER], &[("eventDisplay", "list"), ("paged", "%2")])
        .tax(&["{{ month }}"], &[("eventDisplay", "month")])
        .tax(&["{{ month }}", "{{ featured }}"], &[("eventDisplay", "month"), ("featured", "1")])
        .tax(&["{{ list }}"], &[("eventDisplay", "list")])
        .tax(&["{{ list }}", "{{ featured }}"], &[("eventDisplay", "list"), ("featured", "1")])
        .tax(&["{{ today }}"], &[("eventDisplay", "day")])
        .tax(&["{{ today }}", "{{ featured }}"], &[("eventDisplay", "day"), ("featured", "1")])
        .tax(&["{{ day }}", DAY_DATE], &[("eventDisplay", "day"), ("eventDate", "%2")])
        .tax(
            &["{{ day }}", DAY_DATE, "{{ featured }}"],
            &[("eventDisplay", "day"), ("eventDate", "%2"), ("featured", "1")],
        )
        .tax(&[MONTH_DATE], &[("eventDisplay", "month"), ("eventDate", "%2")])
        .tax(
            &[MONTH_DATE, "{{ featured }}"],
            &[("eventDisplay", "month"), ("eventDate", "%2"), ("featured", "1")],
        )
        .tax(&[DAY_DATE], &[("eventDisplay", "day"), ("eventDate", "%2")])
        .tax(
            &[DAY_DATE, "{{ featured }}"],
            &[("eventDisplay", "day"), ("eventDate", "%2"), ("featured", "1")],
        )
        .tax(&["{{ featured }}", "feed", FEEDS], &[("featured", "1"), ("feed", "%2")])
        .tax(&["feed", FEEDS], &[("feed", "%2")])
        .tax(
            &["{{ featured }}", "feed"],
            &[("featured", "1"), ("eventDisplay", "list"), ("feed", "rss2")],
        )
        .tax(&["feed"], &[("eventDisplay", "list"), ("feed", "rss2")])
        .tax(&["{{ featured }}", "ical"], &[("featured", "1"), ("ical", "1")])
        .tax(&["ical"], &[("ical", "1")])
        .tax(&["{{ featured }}"], &[("featured", "1"), ("eventDisplay", "default")])
        .tax(&[], &[("eventDisplay", "default")])
}

fn tag_rules(rules: RuleList) -> RuleList {
    rules
        .tag(&["{{ page }}", PAGE_NUMBER], &[("eventDisplay", "list"), ("paged", "%2")])
        .tag(
            &["{{ featured }}", "{{ page }}", PAGE_NUMBER],
            &[("featured", "1"), ("eventDisplay", "list"), ("paged", "%2")],
        )
        .tag(&["{{ month }}"], &[("eventDisplay", "month")])
        .tag(&["{{ month }}", "{{ featured }}"], &[("eventDisplay", "month"), ("featured", "1")])
        .tag(&["{{ list }}", "{{ page }}", PAGE_NUMBER], &[("eventDisplay", "list"), ("paged", "%2")])
        .tag(
            &["{{ list }}", "{{ featured }}", "{{ page }}", PAGE_NUMBER],
            &[("eventDisplay", "list"), ("featured", "1"), ("paged", "%2")],
        )
        .tag(&["{{ list }}"], &[("eventDisplay", "list")])
        .tag(&["{{ list }}", "{{ featured }}"], &[("eventDisplay", "list"), ("featured", "1")])
        .tag(&["{{ today }}"], &[("eventDisplay", "day")])
        .tag(&["{{ today }}", "{{ featured }}"], &[("eventDisplay", "day"), ("featured", "1")])
        .tag(&["{{ day }}", DAY_DATE], &[("eventDisplay", "day"), ("eventDate", "%2")])
        .tag(
            &["{{ day }}", DAY_DATE, "{{ featured }}"],
            &[("eventDisplay", "day"), ("eventDate", "%2"), ("featured", "1")],
        )
        .tag(&[MONTH_DATE], &[("eventDisplay", "month"), ("eventDate", "%2")])
        .tag(
            &[MONTH_DATE, "{{ featured }}"],
            &[("eventDisplay", "month"), ("eventDate", "%2"), ("featured", "1")],
        )
        .tag(&[DAY_DATE], &[("eventDisplay", "day"), ("eventDate", "%2")])
        .tag(
            &[DAY_DATE, "{{ featured }}"],
            &[("eventDisplay", "day"), ("eventDate", "%2"), ("featured", "1")],
        )
        .tag(&["feed"], &[("eventDisplay", "list"), ("feed", "rss2")])
        .tag(
            &["{{ featured }}", "feed"],
            &[("eventDisplay", "list"), ("feed", "rss2"), ("featured", "1")],
        )
        .tag(&["ical"], &[("ical", "1")])
        .tag(&["{{ featured }}", "ical"], &[("featured", "1"), ("ical", "1")])
        .tag(&["feed", FEEDS], &[("feed", "%2")])
        .tag(&["{{ featured }}", "feed", FEEDS], &[("featured", "1"), ("feed", "%2")])
        .tag(&["{{ featured }}"], &[("featured", "1")])
        .tag(&[], &[("eventDisplay", "default")])
}
