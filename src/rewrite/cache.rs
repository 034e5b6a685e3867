//! Locale-keyed get-or-build cache shared by the resolver and the generator.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Values are immutable once stored; a rebuild replaces the whole slot.
/// Two racing builders for the same locale both succeed and the last
/// insert wins, which is fine because building is pure.
#[derive(Debug)]
pub struct LocaleCache<T> {
    name: &'static str,
    slots: Arc<RwLock<HashMap<String, Arc<T>>>>,
}

impl<T> Clone for LocaleCache<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> LocaleCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get(&self, locale: &str) -> Option<Arc<T>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(locale).cloned()
    }

    pub fn get_or_build<F>(&self, locale: &str, build: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(locale) {
            debug!("{} cache hit for locale {}", self.name, locale);
            return value;
        }

        debug!("{} cache miss for locale {}, building", self.name, locale);
        let value = Arc::new(build());

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(locale.to_string(), Arc::clone(&value));
        value
    }

    /// Like [`get_or_build`](Self::get_or_build) for fallible builders;
    /// failures are not cached.
    pub fn try_get_or_build<F, E>(&self, locale: &str, build: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get(locale) {
            debug!("{} cache hit for locale {}", self.name, locale);
            return Ok(value);
        }

        debug!("{} cache miss for locale {}, building", self.name, locale);
        let value = Arc::new(build()?);

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(locale.to_string(), Arc::clone(&value));
        Ok(value)
    }

    pub fn clear(&self) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if !slots.is_empty() {
            debug!("Clearing {} {} cache slot(s)", slots.len(), self.name);
        }
        slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
