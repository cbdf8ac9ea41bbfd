use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{LocalizeError, Result};
use crate::model::config::CollisionPolicy;

const FALLBACK_SUFFIX: &str = "localized";
const MAX_FALLBACK_ATTEMPTS: usize = 100;

/// How an output directory was obtained.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Existing,
    Created,
    /// The requested path was a file; a sibling directory was used
    Fallback,
    /// The requested path was a file and has been replaced by a directory
    Overwritten,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OutputDir {
    pub requested: PathBuf,
    pub path: PathBuf,
    pub resolution: Resolution,
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> LocalizeError + '_ {
    move |source| LocalizeError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Makes `requested` usable as an output directory under `policy`.
pub fn resolve_dir(requested: &Path, policy: CollisionPolicy) -> Result<OutputDir> {
    let done = |path: PathBuf, resolution| OutputDir {
        requested: requested.to_path_buf(),
        path,
        resolution,
    };

    if requested.is_dir() {
        return Ok(done(requested.to_path_buf(), Resolution::Existing));
    }

    if !requested.exists() {
        fs::create_dir_all(requested).map_err(write_err(requested))?;
        return Ok(done(requested.to_path_buf(), Resolution::Created));
    }

    match policy {
        CollisionPolicy::Fail => Err(refuse(requested)),
        CollisionPolicy::Overwrite => {
            warn!(path = %requested.display(), "output path is a file, replacing it with a directory");
            fs::remove_file(requested).map_err(write_err(requested))?;
            fs::create_dir_all(requested).map_err(write_err(requested))?;
            Ok(done(requested.to_path_buf(), Resolution::Overwritten))
        }
        CollisionPolicy::Fallback => {
            let path = fallback_dir(requested)?;
            warn!(
                requested = %requested.display(),
                path = %path.display(),
                "output path is a file, writing to fallback directory"
            );
            Ok(done(path, Resolution::Fallback))
        }
    }
}

fn refuse(requested: &Path) -> LocalizeError {
    warn!(path = %requested.display(), "output path is a file, refusing to touch it");
    LocalizeError::Collision {
        path: requested.to_path_buf(),
    }
}

/// Fails when `policy` would refuse `requested`. Touches nothing.
fn check_dir(requested: &Path, policy: CollisionPolicy) -> Result<()> {
    if policy == CollisionPolicy::Fail && requested.exists() && !requested.is_dir() {
        return Err(refuse(requested));
    }
    Ok(())
}

fn fallback_dir(requested: &Path) -> Result<PathBuf> {
    let base = requested
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();

    for attempt in 1..=MAX_FALLBACK_ATTEMPTS {
        let name = if attempt == 1 {
            format!("{base}.{FALLBACK_SUFFIX}")
        } else {
            format!("{base}.{FALLBACK_SUFFIX}-{attempt}")
        };
        let candidate = requested.with_file_name(name);

        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !candidate.exists() {
            fs::create_dir_all(&candidate).map_err(write_err(&candidate))?;
            return Ok(candidate);
        }
    }

    Err(LocalizeError::Collision {
        path: requested.to_path_buf(),
    })
}

/// Makes a locale identifier safe to embed in a file name.
/// Keeps ASCII letters, digits, `-`, `_` and `.`; everything else becomes `_`.
pub fn safe_locale_name(locale: &str) -> String {
    let mut out = String::with_capacity(locale.len());
    for ch in locale.trim().chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }

    let out = out.trim_matches('.').to_string();
    if out.is_empty() {
        "locale".to_string()
    } else {
        out
    }
}

pub fn pretty_name(stem: &str, locale: &str) -> String {
    format!("{stem}_{}.json", safe_locale_name(locale))
}

pub fn minified_name(stem: &str, locale: &str) -> String {
    format!("{stem}_{}.min.json", safe_locale_name(locale))
}

/// Two-space indentation, non-ASCII kept as is.
pub fn render_pretty(doc: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(doc).map_err(LocalizeError::Serialize)
}

pub fn render_minified(doc: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(doc).map_err(LocalizeError::Serialize)
}

pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(&tmp)(e));
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(path)(e));
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "output".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

/// Files written for one locale.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct WrittenLocale {
    pub pretty_path: PathBuf,
    pub minified_path: Option<PathBuf>,
    /// SHA-256 of the pretty document
    pub digest: String,
}

/// Writes localized documents under names derived from locale ids.
#[derive(Debug)]
pub struct LocaleWriter {
    pretty: OutputDir,
    minified: Option<OutputDir>,
    stem: String,
    // file name -> locale that claimed it
    claimed: HashMap<String, String>,
}

impl LocaleWriter {
    /// Resolves the output directories. Nothing is written yet, and a
    /// refused directory leaves the other one uncreated.
    pub fn open(
        pretty_dir: &Path,
        minified_dir: Option<&Path>,
        stem: &str,
        policy: CollisionPolicy,
    ) -> Result<Self> {
        for dir in std::iter::once(pretty_dir).chain(minified_dir) {
            check_dir(dir, policy)?;
        }

        let pretty = resolve_dir(pretty_dir, policy)?;
        let minified = minified_dir
            .map(|dir| resolve_dir(dir, policy))
            .transpose()?;

        for dir in std::iter::once(&pretty).chain(minified.as_ref()) {
            info!(
                path = %dir.path.display(),
                resolution = ?dir.resolution,
                "output directory ready"
            );
        }

        Ok(Self {
            pretty,
            minified,
            stem: stem.to_string(),
            claimed: HashMap::new(),
        })
    }

    pub fn pretty_dir(&self) -> &OutputDir {
        &self.pretty
    }

    pub fn minified_dir(&self) -> Option<&OutputDir> {
        self.minified.as_ref()
    }

    pub fn write(&mut self, locale: &str, doc: &Value) -> Result<WrittenLocale> {
        let name = pretty_name(&self.stem, locale);
        if let Some(previous) = self.claimed.get(&name) {
            return Err(LocalizeError::DuplicateFileName {
                locale: locale.to_string(),
                previous: previous.clone(),
                file_name: name,
            });
        }
        self.claimed.insert(name.clone(), locale.to_string());

        let pretty_bytes = render_pretty(doc)?;
        let pretty_path = self.pretty.path.join(&name);
        let minified = match &self.minified {
            Some(dir) => Some((
                dir.path.join(minified_name(&self.stem, locale)),
                render_minified(doc)?,
            )),
            None => None,
        };

        // a locale lands in full or not at all: minified first, pretty last
        if let Some((path, bytes)) = &minified {
            write_atomic(path, bytes)?;
        }
        if let Err(e) = write_atomic(&pretty_path, &pretty_bytes) {
            if let Some((path, _)) = &minified {
                let _ = fs::remove_file(path);
            }
            return Err(e);
        }

        Ok(WrittenLocale {
            pretty_path,
            minified_path: minified.map(|(path, _)| path),
            digest: digest(&pretty_bytes),
        })
    }
}
