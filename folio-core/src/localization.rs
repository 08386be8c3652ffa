//! Localization tables.
//!
//! A table maps locales to key/value entries. Documents read them with
//! `.localize {table:key}` in the locale set by `.doclang`; the built-in
//! `std` table holds the labels folio itself prints.

use crate::error::{FolioError, Result};
use std::collections::HashMap;

/// Entries of one table, per locale tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizationTable {
    locales: HashMap<String, HashMap<String, String>>,
}

impl LocalizationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale<'a>(mut self, locale: &str, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.insert(
            locale,
            entries.into_iter().map(|(k, v)| (k.to_string(), v.to_string())),
        );
        self
    }

    /// Add entries for a locale, replacing existing keys
    pub fn insert(&mut self, locale: &str, entries: impl IntoIterator<Item = (String, String)>) {
        self.locales
            .entry(normalize_locale(locale))
            .or_default()
            .extend(entries);
    }

    /// Entries of `locale`, falling back from `en-us` to `en`
    fn entries(&self, locale: &str) -> Option<&HashMap<String, String>> {
        let locale = normalize_locale(locale);
        self.locales.get(&locale).or_else(|| {
            let language = locale.split('-').next()?;
            self.locales.get(language)
        })
    }
}

fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

/// Named localization tables of a context
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizationTables {
    tables: HashMap<String, LocalizationTable>,
}

impl Default for LocalizationTables {
    fn default() -> Self {
        let mut tables = HashMap::new();
        tables.insert(STD_TABLE.to_string(), std_table());
        Self { tables }
    }
}

pub const STD_TABLE: &str = "std";

impl LocalizationTables {
    pub fn table_mut(&mut self, name: &str) -> &mut LocalizationTable {
        self.tables.entry(name.to_string()).or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Look up `key` in `table` for `locale`
    pub fn get(&self, table: &str, key: &str, locale: Option<&str>) -> Result<String> {
        let entries = self
            .tables
            .get(table)
            .ok_or_else(|| FolioError::localization(format!("no localization table '{}'", table)))?;
        let locale = locale.ok_or_else(|| {
            FolioError::localization(format!("cannot localize '{}': the document has no locale", key))
        })?;
        let entries = entries.entries(locale).ok_or_else(|| {
            FolioError::localization(format!("table '{}' has no entries for locale '{}'", table, locale))
        })?;
        entries.get(key).cloned().ok_or_else(|| {
            FolioError::localization(format!(
                "no key '{}' in table '{}' for locale '{}'",
                key, table, locale
            ))
        })
    }

    /// Resolve a `table:key` reference; a bare key reads the `std` table
    pub fn resolve(&self, reference: &str, locale: Option<&str>) -> Result<String> {
        let (table, key) = reference
            .split_once(':')
            .unwrap_or((STD_TABLE, reference));
        self.get(table.trim(), key.trim(), locale)
    }
}

fn std_table() -> LocalizationTable {
    LocalizationTable::new()
        .with_locale(
            "en",
            [
                ("tableofcontents", "Table of Contents"),
                ("bibliography", "Bibliography"),
                ("figure", "Figure"),
                ("listing", "Listing"),
                ("equation", "Equation"),
            ],
        )
        .with_locale(
            "it",
            [
                ("tableofcontents", "Indice"),
                ("bibliography", "Bibliografia"),
                ("figure", "Figura"),
                ("listing", "Codice"),
                ("equation", "Equazione"),
            ],
        )
        .with_locale(
            "de",
            [
                ("tableofcontents", "Inhaltsverzeichnis"),
                ("bibliography", "Literaturverzeichnis"),
                ("figure", "Abbildung"),
                ("listing", "Listing"),
                ("equation", "Gleichung"),
            ],
        )
        .with_locale(
            "fr",
            [
                ("tableofcontents", "Table des matières"),
                ("bibliography", "Bibliographie"),
                ("figure", "Figure"),
                ("listing", "Listing"),
                ("equation", "Équation"),
            ],
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_table_with_region_fallback() {
        let tables = LocalizationTables::default();
        assert_eq!(
            tables.resolve("std:tableofcontents", Some("it")).unwrap(),
            "Indice"
        );
        assert_eq!(
            tables.resolve("bibliography", Some("en_US")).unwrap(),
            "Bibliography"
        );
    }

    #[test]
    fn test_missing_table_key_and_locale() {
        let tables = LocalizationTables::default();
        for (reference, locale) in [
            ("nope:key", Some("en")),
            ("std:nope", Some("en")),
            ("std:figure", Some("ja")),
            ("std:figure", None),
        ] {
            let err = tables.resolve(reference, locale).unwrap_err();
            assert!(matches!(err, FolioError::Localization { .. }), "{}", reference);
        }
    }

    #[test]
    fn test_user_table() {
        let mut tables = LocalizationTables::default();
        tables
            .table_mut("greetings")
            .insert("en", [("hello".to_string(), "Hello".to_string())]);
        assert_eq!(tables.resolve("greetings:hello", Some("en-GB")).unwrap(), "Hello");
    }
}
