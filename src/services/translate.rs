use std::slice;

use serde_json::{map, Map, Value};

use crate::error::Result;
use crate::model::config::{FieldKeyMap, LocalizerConfig};
use crate::model::locale::LocaleMap;
use crate::parsers::lexeme::Lexer;
use crate::services::substitute::Substituter;

/// Something the key renamer had to decide on its own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyNote {
    /// The label token is missing from the locale; the key was kept
    LabelFallback { key: String, token: String },
    /// The label is already a key of the same object, in the source or in
    /// the output built so far; the key was kept. Source keys count even
    /// when they are renamed away themselves, so a rename never depends on
    /// how a sibling later in the object turns out.
    RenameConflict { key: String, label: String },
}

/// Walks a document tree and localizes every string leaf.
#[derive(Debug, Clone)]
pub struct Translator {
    substituter: Substituter,
    field_keys: FieldKeyMap,
    rename_keys: bool,
}

enum Entered<'t> {
    Leaf(Value),
    Frame(Frame<'t>),
}

/// An open container: children still to visit plus what has been built.
enum Frame<'t> {
    Object {
        source: &'t Map<String, Value>,
        entries: map::Iter<'t>,
        out: Map<String, Value>,
        pending_key: Option<String>,
    },
    Array {
        items: slice::Iter<'t, Value>,
        out: Vec<Value>,
    },
}

impl<'t> Frame<'t> {
    fn push(&mut self, value: Value) {
        match self {
            Frame::Object { out, pending_key, .. } => {
                if let Some(key) = pending_key.take() {
                    out.insert(key, value);
                }
            }
            Frame::Array { out, .. } => out.push(value),
        }
    }

    fn finish(self) -> Value {
        match self {
            Frame::Object { out, .. } => Value::Object(out),
            Frame::Array { out, .. } => Value::Array(out),
        }
    }
}

impl Translator {
    pub fn new(substituter: Substituter, field_keys: FieldKeyMap, rename_keys: bool) -> Self {
        Self {
            substituter,
            field_keys,
            rename_keys,
        }
    }

    pub fn from_config(cfg: &LocalizerConfig) -> Result<Self> {
        let lexer = Lexer::new(&cfg.token_pattern)?;
        Ok(Self::new(
            Substituter::new(lexer, cfg.match_mode),
            cfg.field_keys.clone(),
            cfg.rename_keys,
        ))
    }

    pub fn substituter(&self) -> &Substituter {
        &self.substituter
    }

    pub fn field_keys(&self) -> &FieldKeyMap {
        &self.field_keys
    }

    pub fn renames_keys(&self) -> bool {
        self.rename_keys
    }

    /// Returns a localized deep copy of `tree`. The input is never touched,
    /// so one source document can be reused for every locale.
    pub fn translate(&self, tree: &Value, locale: &LocaleMap) -> Value {
        self.translate_noted(tree, locale).0
    }

    /// Like [`Translator::translate`], also returning key renaming notes.
    ///
    /// Containers are walked with an explicit stack, so nesting depth is
    /// bounded by heap rather than by the native call stack.
    pub fn translate_noted(&self, tree: &Value, locale: &LocaleMap) -> (Value, Vec<KeyNote>) {
        let mut notes = Vec::new();

        let mut frame = match self.enter(tree, locale) {
            Entered::Leaf(value) => return (value, notes),
            Entered::Frame(frame) => frame,
        };
        let mut parents: Vec<Frame<'_>> = Vec::new();

        loop {
            match self.next_child(&mut frame, locale, &mut notes) {
                Some(child) => match self.enter(child, locale) {
                    Entered::Leaf(value) => frame.push(value),
                    Entered::Frame(inner) => parents.push(std::mem::replace(&mut frame, inner)),
                },
                None => {
                    let done = frame.finish();
                    match parents.pop() {
                        Some(mut parent) => {
                            parent.push(done);
                            frame = parent;
                        }
                        None => return (done, notes),
                    }
                }
            }
        }
    }

    fn enter<'t>(&self, value: &'t Value, locale: &LocaleMap) -> Entered<'t> {
        match value {
            Value::Object(obj) => Entered::Frame(Frame::Object {
                source: obj,
                entries: obj.iter(),
                out: Map::with_capacity(obj.len()),
                pending_key: None,
            }),
            Value::Array(arr) => Entered::Frame(Frame::Array {
                items: arr.iter(),
                out: Vec::with_capacity(arr.len()),
            }),
            Value::String(s) => {
                Entered::Leaf(Value::String(self.substituter.substitute(s, locale).into_owned()))
            }
            Value::Number(_) | Value::Bool(_) | Value::Null => Entered::Leaf(value.clone()),
        }
    }

    /// Advances `frame`, fixing the output key for object entries.
    fn next_child<'t>(
        &self,
        frame: &mut Frame<'t>,
        locale: &LocaleMap,
        notes: &mut Vec<KeyNote>,
    ) -> Option<&'t Value> {
        match frame {
            Frame::Array { items, .. } => items.next(),
            Frame::Object {
                source,
                entries,
                out,
                pending_key,
            } => {
                let (key, value) = entries.next()?;
                let taken = |label: &str| source.contains_key(label) || out.contains_key(label);
                *pending_key = Some(self.output_key(key, taken, locale, notes));
                Some(value)
            }
        }
    }

    /// A label that would clash with another key of the same object, in the
    /// source or already emitted, is refused so no entry gets overwritten.
    fn output_key(
        &self,
        key: &str,
        taken: impl Fn(&str) -> bool,
        locale: &LocaleMap,
        notes: &mut Vec<KeyNote>,
    ) -> String {
        if !self.rename_keys {
            return key.to_string();
        }
        let Some(token) = self.field_keys.token_for(key) else {
            return key.to_string();
        };

        match self.substituter.resolve(token, locale) {
            Some(label) if label != key && taken(label) => {
                notes.push(KeyNote::RenameConflict {
                    key: key.to_string(),
                    label: label.to_string(),
                });
                key.to_string()
            }
            Some(label) => label.to_string(),
            None => {
                notes.push(KeyNote::LabelFallback {
                    key: key.to_string(),
                    token: token.to_string(),
                });
                key.to_string()
            }
        }
    }
}
