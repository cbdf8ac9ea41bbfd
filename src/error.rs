use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading inputs or writing localized documents.
#[derive(Error, Debug)]
pub enum LocalizeError {
    /// An input file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid JSON
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The translation table does not have the locale -> token -> text shape
    #[error("malformed translation table: {0}")]
    MalformedTable(String),

    /// The configured token pattern does not compile
    #[error("invalid token pattern: {0}")]
    TokenPattern(#[from] regex::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// An output directory path is occupied by a file and the policy forbids touching it
    #[error("output path {} exists and is not a directory", .path.display())]
    Collision { path: PathBuf },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Two locale identifiers map onto the same output file name
    #[error("locale {locale} maps to file name {file_name}, already used by {previous}")]
    DuplicateFileName {
        locale: String,
        previous: String,
        file_name: String,
    },
}

impl LocalizeError {
    /// Input and configuration errors stop the run before anything is written.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LocalizeError::Read { .. }
                | LocalizeError::Json { .. }
                | LocalizeError::MalformedTable(_)
                | LocalizeError::TokenPattern(_)
                | LocalizeError::Config(_)
                | LocalizeError::Collision { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LocalizeError>;
