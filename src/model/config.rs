use serde::{Deserialize, Serialize};

use crate::parsers::lexeme::DEFAULT_TOKEN_PATTERN;

/// Structural keys that may be renamed to a localized label, with the
/// token holding that label. The subgroup token keeps the spelling used by
/// the translation sheets.
pub const DEFAULT_FIELD_KEYS: [(&str, &str); 4] = [
    ("Cookie subgroup", "CookiePolicyTableCookeiSubgroup"),
    ("Cookies", "CookiePolicyTableCookies"),
    ("Cookies used", "CookiePolicyTableCookiesUsed"),
    ("Lifespan", "CookiePolicyTableLifespan"),
];

fn default_translations() -> String {
    "translation_key.json".to_string()
}

fn default_input() -> String {
    "converted_cookie_data.json".to_string()
}

fn default_pretty_dir() -> String {
    "out".to_string()
}

fn default_minified_dir() -> Option<String> {
    Some("minified".to_string())
}

fn default_file_stem() -> String {
    "cookie_data".to_string()
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Tokens must match verbatim
    #[default]
    Exact,
    /// Fall back to a lower-cased comparison when no verbatim key exists
    CaseInsensitive,
}

/// What to do when an output directory path is taken by a regular file.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Refuse and stop before writing anything
    Fail,
    /// Write into a clearly named sibling directory instead
    #[default]
    Fallback,
    /// Remove the file and create the directory in its place
    Overwrite,
}

/// Ordered key -> token pairs used for key renaming.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldKeyMap(Vec<(String, String)>);

impl FieldKeyMap {
    pub fn new<K, T>(entries: impl IntoIterator<Item = (K, T)>) -> Self
    where
        K: Into<String>,
        T: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, t)| (k.into(), t.into()))
                .collect(),
        )
    }

    pub fn token_for(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, t)| (k.as_str(), t.as_str()))
    }
}

impl Default for FieldKeyMap {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_KEYS)
    }
}

/// Settings for one localization run, as stored in a config file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocalizerConfig {
    #[serde(default = "default_translations")]
    pub translations: String,

    #[serde(default = "default_input")]
    pub input: String,

    #[serde(default = "default_pretty_dir", alias = "outdir")]
    pub pretty_dir: String,

    /// `null` disables minified output
    #[serde(default = "default_minified_dir", alias = "minout")]
    pub minified_dir: Option<String>,

    #[serde(default = "default_file_stem")]
    pub file_stem: String,

    #[serde(default, alias = "translate_keys")]
    pub rename_keys: bool,

    #[serde(default)]
    pub match_mode: MatchMode,

    #[serde(default)]
    pub collision: CollisionPolicy,

    #[serde(default)]
    pub field_keys: FieldKeyMap,

    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    #[serde(default = "default_true")]
    pub audit: bool,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            translations: default_translations(),
            input: default_input(),
            pretty_dir: default_pretty_dir(),
            minified_dir: default_minified_dir(),
            file_stem: default_file_stem(),
            rename_keys: false,
            match_mode: MatchMode::default(),
            collision: CollisionPolicy::default(),
            field_keys: FieldKeyMap::default(),
            token_pattern: default_token_pattern(),
            audit: true,
        }
    }
}
