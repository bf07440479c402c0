//! Locale lookup table: which locale variants exist for each logical page.
//!
//! Built from ALL loaded instances of a route before anything of that route
//! is rendered, so "switch locale" lookups see the complete sibling set.

use crate::types::LoadedInstance;
use std::collections::BTreeMap;

/// `key → (locale → instance)` for one route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTable {
    entries: BTreeMap<String, BTreeMap<String, LoadedInstance>>,
}

impl LocaleTable {
    pub fn build<'a>(instances: impl IntoIterator<Item = &'a LoadedInstance>) -> Self {
        let mut table = Self::default();
        for instance in instances {
            table.insert(instance);
        }
        table
    }

    /// Register an instance. Every key gets an entry; only instances with a
    /// locale are listed under it.
    pub fn insert(&mut self, instance: &LoadedInstance) {
        let locales = self.entries.entry(instance.key.clone()).or_default();
        if let Some(locale) = &instance.locale {
            locales.insert(locale.clone(), instance.clone());
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn has_locale(&self, key: &str, locale: &str) -> bool {
        self.get(key, locale).is_some()
    }

    pub fn get(&self, key: &str, locale: &str) -> Option<&LoadedInstance> {
        self.entries.get(key)?.get(locale)
    }

    /// Every locale variant of `key`, ordered by locale code.
    pub fn variants(&self, key: &str) -> impl Iterator<Item = (&str, &LoadedInstance)> {
        self.entries
            .get(key)
            .into_iter()
            .flat_map(|locales| locales.iter().map(|(locale, instance)| (locale.as_str(), instance)))
    }

    /// Number of logical pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
