use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::config::{CollisionPolicy, LocalizerConfig};
use crate::model::locale::TranslationTable;
use crate::services::loader;
use crate::services::output::{LocaleWriter, OutputDir};
use crate::services::qa::{self, Auditor, QaIssue};
use crate::services::translate::Translator;

/// Where localized documents go.
#[derive(Debug, Clone)]
pub struct Destinations {
    pub pretty_dir: PathBuf,
    pub minified_dir: Option<PathBuf>,
    pub file_stem: String,
    pub collision: CollisionPolicy,
}

impl Destinations {
    pub fn from_config(cfg: &LocalizerConfig) -> Self {
        Self {
            pretty_dir: PathBuf::from(&cfg.pretty_dir),
            minified_dir: cfg.minified_dir.as_ref().map(PathBuf::from),
            file_stem: cfg.file_stem.clone(),
            collision: cfg.collision,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct LocaleOutcome {
    pub locale: String,
    pub ok: bool,
    pub pretty_path: Option<PathBuf>,
    pub minified_path: Option<PathBuf>,
    pub digest: Option<String>,
    pub error: Option<String>,
    pub issues: Vec<QaIssue>,
}

#[derive(Debug, Serialize, Clone)]
pub struct OutputDirs {
    pub pretty: OutputDir,
    pub minified: Option<OutputDir>,
}

#[derive(Debug, Serialize, Clone)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub outputs: OutputDirs,
    pub locales: Vec<LocaleOutcome>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &LocaleOutcome> {
        self.locales.iter().filter(|l| !l.ok)
    }
}

/// Localizes `document` once per locale of `table` and writes the results.
///
/// A locale that cannot be written is recorded and the batch goes on.
/// Only an unusable output directory stops the run, before any locale.
pub fn run(
    table: &TranslationTable,
    document: &Value,
    translator: &Translator,
    destinations: &Destinations,
    audit: bool,
) -> Result<BatchReport> {
    let mut writer = LocaleWriter::open(
        &destinations.pretty_dir,
        destinations.minified_dir.as_deref(),
        &destinations.file_stem,
        destinations.collision,
    )?;

    let auditor = audit.then(|| Auditor::new(document, table, translator.substituter()));

    let mut locales: Vec<LocaleOutcome> = Vec::with_capacity(table.len());
    let mut processed = 0usize;
    let mut skipped = 0usize;

    for (locale, map) in table.iter() {
        if map.is_empty() {
            debug!(locale = %locale, "locale has no tokens, output will mirror the source");
        }

        let (localized, notes) = translator.translate_noted(document, map);

        let issues = match &auditor {
            Some(a) => a.audit(locale, map, translator.substituter(), &notes),
            None => Vec::new(),
        };
        for issue in &issues {
            warn!(locale = %locale, code = ?issue.code, "{}", issue.message);
        }

        match writer.write(locale, &localized) {
            Ok(written) => {
                info!(
                    locale = %locale,
                    path = %written.pretty_path.display(),
                    "localized document written"
                );
                processed += 1;
                locales.push(LocaleOutcome {
                    locale: locale.to_string(),
                    ok: true,
                    pretty_path: Some(written.pretty_path),
                    minified_path: written.minified_path,
                    digest: Some(written.digest),
                    error: None,
                    issues,
                });
            }
            Err(e) => {
                warn!(locale = %locale, error = %e, "locale skipped");
                skipped += 1;
                locales.push(LocaleOutcome {
                    locale: locale.to_string(),
                    ok: false,
                    pretty_path: None,
                    minified_path: None,
                    digest: None,
                    error: Some(e.to_string()),
                    issues,
                });
            }
        }
    }

    Ok(BatchReport {
        processed,
        skipped,
        outputs: OutputDirs {
            pretty: writer.pretty_dir().clone(),
            minified: writer.minified_dir().cloned(),
        },
        locales,
    })
}

/// Loads both inputs, then runs the batch. Input errors surface before any
/// output directory is touched.
pub fn run_from_config(cfg: &LocalizerConfig) -> Result<BatchReport> {
    let translator = Translator::from_config(cfg)?;
    let table = loader::load_table(Path::new(&cfg.translations))?;
    let document = loader::load_document(Path::new(&cfg.input))?;

    if let Some(issue) = qa::check_shape(&document) {
        warn!(path = %cfg.input, "source document is not a canonical notice: {}", issue.message);
    }
    if table.is_empty() {
        warn!(path = %cfg.translations, "translation table has no locales");
    }

    run(
        &table,
        &document,
        &translator,
        &Destinations::from_config(cfg),
        cfg.audit,
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;
    use crate::model::locale::LocaleMap;

    fn destinations(root: &Path, minified: bool) -> Destinations {
        Destinations {
            pretty_dir: root.join("out"),
            minified_dir: minified.then(|| root.join("minified")),
            file_stem: "cookie_data".into(),
            collision: CollisionPolicy::Fallback,
        }
    }

    fn translator() -> Translator {
        Translator::from_config(&LocalizerConfig::default()).unwrap()
    }

    fn table() -> TranslationTable {
        let mut table = TranslationTable::new();
        table.push(
            "de-DE",
            [("CookiePolicyTableDays", "Tage")].into_iter().collect(),
        );
        table.push("fr-FR", [("CookiePolicyTableDays", "jours")].into_iter().collect());
        table.push("xx", LocaleMap::new());
        table
    }

    #[rstest]
    fn writes_one_document_per_locale() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = json!({"Lifespan": "395 CookiePolicyTableDays"});

        let report = run(&table(), &doc, &translator(), &destinations(tmp.path(), true), true)
            .unwrap();

        assert_that!(report.processed, eq(3));
        assert_that!(report.skipped, eq(0));
        for locale in ["de-DE", "fr-FR", "xx"] {
            let pretty = tmp.path().join("out").join(format!("cookie_data_{locale}.json"));
            let min = tmp.path().join("minified").join(format!("cookie_data_{locale}.min.json"));
            assert_that!(pretty.is_file(), eq(true));
            assert_that!(min.is_file(), eq(true));
        }

        let fr: Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join("out/cookie_data_fr-FR.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(fr, json!({"Lifespan": "395 jours"}));

        let xx: Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join("out/cookie_data_xx.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(xx, doc);
    }

    #[rstest]
    fn missing_tokens_are_attached_to_the_locale() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = json!({"Lifespan": "395 CookiePolicyTableDays"});

        let report = run(&table(), &doc, &translator(), &destinations(tmp.path(), false), true)
            .unwrap();

        let xx = report.locales.iter().find(|l| l.locale == "xx").unwrap();
        assert_that!(xx.issues, len(eq(1)));
        assert_that!(xx.minified_path, none());
    }

    #[rstest]
    fn failing_locale_does_not_stop_the_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = destinations(tmp.path(), false);
        fs::create_dir_all(dest.pretty_dir.join("cookie_data_de-DE.json")).unwrap();

        let report = run(&table(), &json!({}), &translator(), &dest, false).unwrap();

        assert_that!(report.processed, eq(2));
        assert_that!(report.skipped, eq(1));
        let failed: Vec<&str> = report.failed().map(|l| l.locale.as_str()).collect();
        assert_eq!(failed, vec!["de-DE"]);
        assert_that!(report.locales[0].error.is_some(), eq(true));
    }

    #[rstest]
    fn failed_minified_write_leaves_no_pretty_document() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = destinations(tmp.path(), true);
        fs::create_dir_all(
            dest.minified_dir
                .as_ref()
                .unwrap()
                .join("cookie_data_de-DE.min.json"),
        )
        .unwrap();

        let report = run(&table(), &json!({}), &translator(), &dest, false).unwrap();

        assert_that!(report.skipped, eq(1));
        assert_that!(report.locales[0].ok, eq(false));
        assert_that!(dest.pretty_dir.join("cookie_data_de-DE.json").exists(), eq(false));
        assert_that!(dest.pretty_dir.join("cookie_data_fr-FR.json").is_file(), eq(true));
    }

    #[rstest]
    fn unusable_output_dir_stops_before_any_locale() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dest = destinations(tmp.path(), false);
        dest.collision = CollisionPolicy::Fail;
        fs::write(&dest.pretty_dir, "not a directory").unwrap();

        let err = run(&table(), &json!({}), &translator(), &dest, false).unwrap_err();

        assert_that!(err.is_fatal(), eq(true));
    }
}
