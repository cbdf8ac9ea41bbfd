use regex::Regex;

use crate::error::Result;

/// Letters, digits, underscore and hyphen. Placeholder tokens look like
/// `CookiePolicyTableDays`; the hyphen lets locale-style ids such as
/// `en-AU` scan as one lexeme.
pub const DEFAULT_TOKEN_PATTERN: &str = r"[A-Za-z0-9_\-]+";

/// One piece of a scanned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Maximal run matching the token pattern
    Lexeme(&'a str),
    /// Anything between lexemes, kept verbatim
    Text(&'a str),
}

/// Splits strings into lexemes and the text around them.
#[derive(Debug, Clone)]
pub struct Lexer {
    pattern: Regex,
}

impl Lexer {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Leftmost-first, greedy matches never overlap, so every byte of the
    /// input lands in exactly one segment.
    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut out = Vec::new();
        let mut last = 0usize;

        for m in self.pattern.find_iter(text) {
            if m.is_empty() {
                continue;
            }
            if m.start() > last {
                out.push(Segment::Text(&text[last..m.start()]));
            }
            out.push(Segment::Lexeme(m.as_str()));
            last = m.end();
        }

        if last < text.len() {
            out.push(Segment::Text(&text[last..]));
        }

        out
    }

    pub fn lexemes<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| m.as_str())
    }
}
