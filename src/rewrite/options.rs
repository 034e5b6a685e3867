use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Option controlling the events archive slug.
pub const EVENTS_SLUG_OPTION: &str = "eventsSlug";
/// Option controlling the single event slug.
pub const SINGLE_EVENT_SLUG_OPTION: &str = "singleEventSlug";

pub const DEFAULT_EVENTS_SLUG: &str = "events";
pub const DEFAULT_SINGLE_EVENT_SLUG: &str = "event";

/// Site options as stored by the host; read-only from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SiteOptions(BTreeMap<String, String>);

impl SiteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    /// Stored value, or `default` when the option is unset or blank.
    pub fn get(&self, name: &str, default: &str) -> String {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    pub fn events_slug(&self) -> String {
        self.get(EVENTS_SLUG_OPTION, DEFAULT_EVENTS_SLUG)
    }

    pub fn single_event_slug(&self) -> String {
        self.get(SINGLE_EVENT_SLUG_OPTION, DEFAULT_SINGLE_EVENT_SLUG)
    }
}
