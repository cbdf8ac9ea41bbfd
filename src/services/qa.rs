use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::locale::{LocaleMap, TranslationTable};
use crate::model::notice::NoticeDocument;
use crate::services::substitute::Substituter;
use crate::services::translate::KeyNote;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    MissingToken,
    EmptyTranslation,
    KeyLabelFallback,
    KeyRenameConflict,
    DocumentShape,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub code: IssueCode,
    pub subject: String,
    pub message: String,
}

/// Collects, once per run, everything in the source document that could be
/// a token, then checks each locale against it.
#[derive(Debug)]
pub struct Auditor<'a> {
    candidates: BTreeSet<&'a str>,
    table: &'a TranslationTable,
}

impl<'a> Auditor<'a> {
    pub fn new(
        document: &'a Value,
        table: &'a TranslationTable,
        substituter: &'a Substituter,
    ) -> Self {
        let mut candidates = BTreeSet::new();
        for text in string_leaves(document) {
            candidates.insert(text);
            candidates.extend(substituter.lexer().lexemes(text));
        }
        Self { candidates, table }
    }

    pub fn audit(
        &self,
        locale: &str,
        map: &LocaleMap,
        substituter: &Substituter,
        notes: &[KeyNote],
    ) -> Vec<QaIssue> {
        let mut issues: Vec<QaIssue> = Vec::new();

        for &candidate in &self.candidates {
            match substituter.resolve(candidate, map) {
                Some(text) if text.trim().is_empty() => issues.push(QaIssue {
                    code: IssueCode::EmptyTranslation,
                    subject: candidate.to_string(),
                    message: format!("{locale} maps {candidate} to an empty text"),
                }),
                Some(_) => {}
                None => {
                    let known_elsewhere = self.table.iter().any(|(other, m)| {
                        other != locale && substituter.resolve(candidate, m).is_some()
                    });
                    if known_elsewhere {
                        issues.push(QaIssue {
                            code: IssueCode::MissingToken,
                            subject: candidate.to_string(),
                            message: format!(
                                "{candidate} is translated for other locales but not for {locale}"
                            ),
                        });
                    }
                }
            }
        }

        let mut seen: BTreeSet<&KeyNote> = BTreeSet::new();
        for note in notes {
            if !seen.insert(note) {
                continue;
            }
            issues.push(match note {
                KeyNote::LabelFallback { key, token } => QaIssue {
                    code: IssueCode::KeyLabelFallback,
                    subject: key.clone(),
                    message: format!("{locale} has no {token}, key {key} kept"),
                },
                KeyNote::RenameConflict { key, label } => QaIssue {
                    code: IssueCode::KeyRenameConflict,
                    subject: key.clone(),
                    message: format!(
                        "label {label} already used in the same object, key {key} kept"
                    ),
                },
            });
        }

        issues
    }
}

/// All string leaves of a tree, depth first.
pub fn string_leaves(document: &Value) -> Vec<&str> {
    let mut out = Vec::new();
    let mut stack = vec![document];

    while let Some(value) = stack.pop() {
        match value {
            Value::String(s) => out.push(s.as_str()),
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::Object(entries) => stack.extend(entries.values().rev()),
            Value::Number(_) | Value::Bool(_) | Value::Null => {}
        }
    }

    out
}

/// Reports when the document does not look like an extractor notice.
pub fn check_shape(document: &Value) -> Option<QaIssue> {
    match NoticeDocument::deserialize(document) {
        Ok(_) => None,
        Err(e) => Some(QaIssue {
            code: IssueCode::DocumentShape,
            subject: "notice_table".to_string(),
            message: e.to_string(),
        }),
    }
}
