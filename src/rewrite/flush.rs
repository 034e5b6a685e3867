//! One-shot "rebuild the rules on the next request" flag.
//!
//! Activation runs before everything the rules depend on is available, so
//! it only raises a flag; the next served request drops the caches.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub const KEY_DELAYED_FLUSH_REWRITE_RULES: &str = "_tribe_events_delayed_flush_rewrite_rules";

/// Host-provided transient storage.
pub trait TransientStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn delete(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryTransients {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTransients {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransientStore for MemoryTransients {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
    }

    fn delete(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
    }
}

pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Raise the flag.
pub fn schedule_flush(store: &dyn TransientStore) {
    store.set(KEY_DELAYED_FLUSH_REWRITE_RULES, "1");
}

/// Consume the flag. Returns whether a flush is due.
pub fn take_scheduled_flush(store: &dyn TransientStore) -> bool {
    let due = store
        .get(KEY_DELAYED_FLUSH_REWRITE_RULES)
        .map(|value| is_truthy(&value))
        .unwrap_or(false);
    if due {
        store.delete(KEY_DELAYED_FLUSH_REWRITE_RULES);
    }
    due
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_consumed_once() {
        let store = MemoryTransients::new();
        assert!(!take_scheduled_flush(&store));

        schedule_flush(&store);
        assert!(take_scheduled_flush(&store));
        assert!(!take_scheduled_flush(&store));
        assert!(store.get(KEY_DELAYED_FLUSH_REWRITE_RULES).is_none());
    }

    #[test]
    fn test_falsy_flag_is_left_alone() {
        let store = MemoryTransients::new();
        store.set(KEY_DELAYED_FLUSH_REWRITE_RULES, "no");
        assert!(!take_scheduled_flush(&store));
        assert_eq!(store.get(KEY_DELAYED_FLUSH_REWRITE_RULES).as_deref(), Some("no"));
    }

    #[test]
    fn test_is_truthy() {
        for value in ["1", "true", "YES", " on "] {
            assert!(is_truthy(value), "{}", value);
        }
        for value in ["", "0", "false", "off"] {
            assert!(!is_truthy(value), "{}", value);
        }
    }
}
