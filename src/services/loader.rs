use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{LocalizeError, Result};
use crate::model::locale::{LocaleMap, TableSummary, TranslationTable};
use crate::services::encoding;

pub fn load_json(path: &Path) -> Result<Value> {
    let text = encoding::read_text(path)?;
    serde_json::from_str(&text).map_err(|source| LocalizeError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the source document tree.
pub fn load_document(path: &Path) -> Result<Value> {
    let doc = load_json(path)?;
    info!(path = %path.display(), "source document loaded");
    Ok(doc)
}

/// Loads `{ locale: { token: text } }` from disk.
pub fn load_table(path: &Path) -> Result<TranslationTable> {
    let raw = load_json(path)?;
    let (table, summary) = table_from_value(&raw)?;
    info!(
        path = %path.display(),
        locales = summary.locales,
        tokens = summary.tokens,
        "translation table loaded"
    );
    Ok(table)
}

/// Validates and converts a raw translation table.
pub fn table_from_value(raw: &Value) -> Result<(TranslationTable, TableSummary)> {
    let locales = raw.as_object().ok_or_else(|| {
        LocalizeError::MalformedTable("top level must be an object of locales".into())
    })?;

    let mut table = TranslationTable::new();
    let mut tokens = 0usize;
    let mut skipped_nulls = 0usize;

    for (locale, entries) in locales {
        let (map, nulls) = locale_map_from_value(locale, entries)?;
        tokens += map.len();
        skipped_nulls += nulls;
        table.push(locale.as_str(), map);
    }

    let summary = TableSummary {
        locales: table.len(),
        tokens,
        skipped_nulls,
    };
    Ok((table, summary))
}

/// Converts one `{ token: text }` object, returning how many `null` texts
/// were skipped. Blank spreadsheet cells arrive as `null`; skipping them
/// keeps the token visible in the output. Any other non-string is rejected.
pub fn locale_map_from_value(locale: &str, raw: &Value) -> Result<(LocaleMap, usize)> {
    let entries = raw.as_object().ok_or_else(|| {
        LocalizeError::MalformedTable(format!("locale {locale} must map to an object"))
    })?;

    let mut map = LocaleMap::new();
    let mut skipped_nulls = 0usize;

    for (token, text) in entries {
        match text {
            Value::String(s) => map.insert(token.as_str(), s.as_str()),
            Value::Null => {
                warn!(locale = %locale, token = %token, "token has no text, skipped");
                skipped_nulls += 1;
            }
            other => {
                return Err(LocalizeError::MalformedTable(format!(
                    "locale {locale}, token {token}: expected a string, found {}",
                    kind(other)
                )));
            }
        }
    }

    Ok((map, skipped_nulls))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
