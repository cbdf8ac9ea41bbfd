use std::fs;
use std::path::Path;

use crate::error::{LocalizeError, Result};
use crate::model::config::LocalizerConfig;
use crate::parsers::lexeme::Lexer;
use crate::services::encoding;

pub fn open_config(path: &Path) -> Result<LocalizerConfig> {
    let data = encoding::read_text(path)?;
    let cfg: LocalizerConfig = serde_json::from_str(&data)
        .map_err(|e| LocalizeError::Config(format!("{}: {e}", path.display())))?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Writes `cfg` pretty-printed, creating parent directories as needed.
pub fn save_config(path: &Path, cfg: &LocalizerConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LocalizeError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(cfg).map_err(LocalizeError::Serialize)?;

    fs::write(path, json).map_err(|source| LocalizeError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn validate(cfg: &LocalizerConfig) -> Result<()> {
    if cfg.translations.trim().is_empty() {
        return Err(LocalizeError::Config("translations path is empty".into()));
    }
    if cfg.input.trim().is_empty() {
        return Err(LocalizeError::Config("input path is empty".into()));
    }
    if cfg.pretty_dir.trim().is_empty() {
        return Err(LocalizeError::Config("pretty output directory is empty".into()));
    }
    if cfg.minified_dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
        return Err(LocalizeError::Config("minified output directory is empty".into()));
    }
    if cfg.file_stem.trim().is_empty() || cfg.file_stem.contains(['/', '\\']) {
        return Err(LocalizeError::Config(format!(
            "file stem {:?} must be a plain, non-empty name",
            cfg.file_stem
        )));
    }
    for (key, token) in cfg.field_keys.iter() {
        if key.is_empty() || token.is_empty() {
            return Err(LocalizeError::Config(format!(
                "field key mapping {key:?} -> {token:?} has an empty side"
            )));
        }
    }
    Lexer::new(&cfg.token_pattern)?;
    Ok(())
}
