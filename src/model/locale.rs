use std::collections::HashMap;

use serde::Serialize;

/// Token -> localized text for one locale.
///
/// Keeps the file order of its entries so the case-insensitive index can
/// resolve several keys that differ only by case to the first one seen.
#[derive(Debug, Clone, Default)]
pub struct LocaleMap {
    exact: HashMap<String, String>,
    // lower-cased token -> first token with that spelling
    folded: HashMap<String, String>,
    order: Vec<String>,
}

impl LocaleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. A repeated token replaces the text but keeps its position.
    pub fn insert(&mut self, token: impl Into<String>, text: impl Into<String>) {
        let token = token.into();
        let text = text.into();

        if !self.exact.contains_key(&token) {
            self.order.push(token.clone());
        }
        self.folded
            .entry(token.to_lowercase())
            .or_insert_with(|| token.clone());
        self.exact.insert(token, text);
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.exact.get(token).map(String::as_str)
    }

    /// Lookup against lower-cased tokens; the earliest matching entry wins.
    pub fn get_folded(&self, token: &str) -> Option<&str> {
        self.folded
            .get(&token.to_lowercase())
            .and_then(|owner| self.get(owner))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.exact.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|t| self.exact.get_key_value(t))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocaleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LocaleMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// All locale maps of a run, in the order of the source table.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    locales: Vec<(String, LocaleMap)>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, locale: impl Into<String>, map: LocaleMap) {
        self.locales.push((locale.into(), map));
    }

    pub fn get(&self, locale: &str) -> Option<&LocaleMap> {
        self.locales
            .iter()
            .find(|(id, _)| id == locale)
            .map(|(_, map)| map)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocaleMap)> {
        self.locales.iter().map(|(id, map)| (id.as_str(), map))
    }

    pub fn locale_ids(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

/// Counts logged after a table is loaded.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableSummary {
    pub locales: usize,
    pub tokens: usize,
    pub skipped_nulls: usize,
}
