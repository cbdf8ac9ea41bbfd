use std::borrow::Cow;

use serde_json::Value;

use crate::model::config::MatchMode;
use crate::model::locale::LocaleMap;
use crate::parsers::lexeme::{Lexer, Segment};

/// Replaces placeholder tokens inside single strings.
#[derive(Debug, Clone)]
pub struct Substituter {
    lexer: Lexer,
    mode: MatchMode,
}

impl Substituter {
    pub fn new(lexer: Lexer, mode: MatchMode) -> Self {
        Self { lexer, mode }
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Looks a token up verbatim, then lower-cased when the mode allows it.
    pub fn resolve<'m>(&self, token: &str, map: &'m LocaleMap) -> Option<&'m str> {
        match map.get(token) {
            Some(text) => Some(text),
            None if self.mode == MatchMode::CaseInsensitive => map.get_folded(token),
            None => None,
        }
    }

    /// A string that is itself a token is replaced whole. Otherwise each
    /// lexeme found in a locale map is replaced in place and everything else
    /// is kept byte for byte. Unknown lexemes stay as they are.
    pub fn substitute<'s>(&self, text: &'s str, map: &LocaleMap) -> Cow<'s, str> {
        if let Some(whole) = self.resolve(text, map) {
            return Cow::Owned(whole.to_string());
        }

        let segments = self.lexer.segments(text);
        let mut replaced = false;
        let mut out = String::with_capacity(text.len());

        for segment in segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Lexeme(lexeme) => match self.resolve(lexeme, map) {
                    Some(localized) => {
                        out.push_str(localized);
                        replaced = true;
                    }
                    None => out.push_str(lexeme),
                },
            }
        }

        if replaced {
            Cow::Owned(out)
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Strings go through [`Substituter::substitute`]; every other value is
    /// returned as is. Containers are not descended into.
    pub fn substitute_value(&self, value: &Value, map: &LocaleMap) -> Value {
        match value {
            Value::String(s) => Value::String(self.substitute(s, map).into_owned()),
            other => other.clone(),
        }
    }
}
