//! Localizes cookie-notice JSON documents.
//!
//! A source document carries placeholder tokens such as
//! `StrictlynecessaryCategoryName` or compounds like
//! `395 CookiePolicyTableDays`. For every locale of a translation table the
//! tokens are replaced by that locale's text, optionally renaming a fixed
//! set of column keys, and the result is written as pretty and minified
//! JSON.

pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use error::{LocalizeError, Result};
pub use model::config::{CollisionPolicy, FieldKeyMap, LocalizerConfig, MatchMode};
pub use model::locale::{LocaleMap, TranslationTable};
pub use services::batch::{BatchReport, Destinations};
pub use services::translate::Translator;
