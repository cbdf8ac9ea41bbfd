//! End-to-end runs over files on disk.

use std::fs;
use std::path::Path;
use std::process::Command;

use cookie_localizer::model::config::{CollisionPolicy, LocalizerConfig};
use cookie_localizer::services::batch;
use cookie_localizer::services::output::Resolution;
use googletest::prelude::*;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn source_document() -> Value {
    json!({
        "notice_table": [
            {
                "cookie_category": "StrictlynecessaryCategoryName",
                "category_description": "StrictlynecessaryCategoryDescription",
                "cookie_list": [
                    {
                        "Cookie subgroup": "example.com",
                        "Cookies": "JSESSIONID",
                        "Cookies used": "First party",
                        "Lifespan": "CookiePolicyTableSession"
                    },
                    {
                        "Cookie subgroup": "cdn.example.com",
                        "Cookies": "_ga, _gid",
                        "Cookies used": "Third party",
                        "Lifespan": "395 CookiePolicyTableDays"
                    }
                ]
            }
        ]
    })
}

fn translation_table() -> Value {
    json!({
        "en-US": {
            "StrictlynecessaryCategoryName": "Strictly Necessary",
            "StrictlynecessaryCategoryDescription": "These cookies are required.",
            "CookiePolicyTableSession": "Session",
            "CookiePolicyTableDays": "days",
            "CookiePolicyTableLifespan": "Lifespan",
            "CookiePolicyTableCookies": "Cookies"
        },
        "de-DE": {
            "StrictlynecessaryCategoryName": "Unbedingt erforderlich",
            "StrictlynecessaryCategoryDescription": "Diese Cookies sind notwendig.",
            "CookiePolicyTableSession": "Sitzung",
            "CookiePolicyTableDays": "Tage",
            "CookiePolicyTableLifespan": "Dauer",
            "CookiePolicyTableCookies": "Cookies",
            "CookiePolicyTableCookiesUsed": "Verwendete Cookies",
            "CookiePolicyTableCookeiSubgroup": "Untergruppe"
        },
        "ja-JP": {}
    })
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("translation_key.json"),
            serde_json::to_string_pretty(&translation_table()).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join("converted_cookie_data.json"),
            serde_json::to_string_pretty(&source_document()).unwrap(),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> LocalizerConfig {
        let p = |name: &str| self.path().join(name).to_string_lossy().into_owned();
        LocalizerConfig {
            translations: p("translation_key.json"),
            input: p("converted_cookie_data.json"),
            pretty_dir: p("out"),
            minified_dir: Some(p("minified")),
            ..LocalizerConfig::default()
        }
    }

    fn read(&self, rel: &str) -> Value {
        serde_json::from_str(&fs::read_to_string(self.path().join(rel)).unwrap()).unwrap()
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

#[rstest]
fn every_locale_gets_pretty_and_minified_output(workspace: Workspace) {
    let report = batch::run_from_config(&workspace.config()).unwrap();

    assert_that!(report.processed, eq(3));
    assert_that!(report.skipped, eq(0));

    let mut pretty: Vec<String> = fs::read_dir(workspace.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    pretty.sort();
    assert_eq!(
        pretty,
        vec![
            "cookie_data_de-DE.json",
            "cookie_data_en-US.json",
            "cookie_data_ja-JP.json"
        ]
    );

    let mut minified: Vec<String> = fs::read_dir(workspace.path().join("minified"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    minified.sort();
    assert_eq!(
        minified,
        vec![
            "cookie_data_de-DE.min.json",
            "cookie_data_en-US.min.json",
            "cookie_data_ja-JP.min.json"
        ]
    );
}

#[rstest]
fn german_output_is_fully_localized(workspace: Workspace) {
    batch::run_from_config(&workspace.config()).unwrap();

    assert_eq!(
        workspace.read("out/cookie_data_de-DE.json"),
        json!({
            "notice_table": [
                {
                    "cookie_category": "Unbedingt erforderlich",
                    "category_description": "Diese Cookies sind notwendig.",
                    "cookie_list": [
                        {
                            "Cookie subgroup": "example.com",
                            "Cookies": "JSESSIONID",
                            "Cookies used": "First party",
                            "Lifespan": "Sitzung"
                        },
                        {
                            "Cookie subgroup": "cdn.example.com",
                            "Cookies": "_ga, _gid",
                            "Cookies used": "Third party",
                            "Lifespan": "395 Tage"
                        }
                    ]
                }
            ]
        })
    );
    assert_eq!(
        workspace.read("minified/cookie_data_de-DE.min.json"),
        workspace.read("out/cookie_data_de-DE.json")
    );
}

#[rstest]
fn minified_file_has_no_whitespace(workspace: Workspace) {
    batch::run_from_config(&workspace.config()).unwrap();

    let raw = fs::read_to_string(workspace.path().join("minified/cookie_data_ja-JP.min.json"))
        .unwrap();

    assert_that!(raw, not(contains_substring("\n")));
    assert_that!(raw, not(contains_substring(": ")));
}

#[rstest]
fn empty_locale_mirrors_the_source(workspace: Workspace) {
    let report = batch::run_from_config(&workspace.config()).unwrap();

    assert_eq!(workspace.read("out/cookie_data_ja-JP.json"), source_document());
    let ja = report.locales.iter().find(|l| l.locale == "ja-JP").unwrap();
    assert_that!(ja.issues.is_empty(), eq(false));
}

#[rstest]
fn key_renaming_uses_localized_labels_in_place(workspace: Workspace) {
    let cfg = LocalizerConfig {
        rename_keys: true,
        ..workspace.config()
    };
    batch::run_from_config(&cfg).unwrap();

    let de = workspace.read("out/cookie_data_de-DE.json");
    let record = de["notice_table"][0]["cookie_list"][1].as_object().unwrap();
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Untergruppe", "Cookies", "Verwendete Cookies", "Dauer"]);
    assert_that!(record["Dauer"].as_str(), some(eq("395 Tage")));

    // en-US has no subgroup label and keeps the original key
    let en = workspace.read("out/cookie_data_en-US.json");
    let record = en["notice_table"][0]["cookie_list"][0].as_object().unwrap();
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Cookie subgroup", "Cookies", "Cookies used", "Lifespan"]);
}

#[rstest]
fn output_file_in_the_way_is_preserved(workspace: Workspace) {
    fs::write(workspace.path().join("out"), "someone else's file").unwrap();

    let report = batch::run_from_config(&workspace.config()).unwrap();

    assert_eq!(report.outputs.pretty.resolution, Resolution::Fallback);
    assert_that!(
        fs::read_to_string(workspace.path().join("out")).unwrap(),
        eq("someone else's file")
    );
    assert_that!(
        workspace
            .path()
            .join("out.localized/cookie_data_de-DE.json")
            .is_file(),
        eq(true)
    );
}

#[rstest]
fn fail_policy_stops_before_writing(workspace: Workspace) {
    fs::write(workspace.path().join("out"), "someone else's file").unwrap();
    let cfg = LocalizerConfig {
        collision: CollisionPolicy::Fail,
        ..workspace.config()
    };

    let err = batch::run_from_config(&cfg).unwrap_err();

    assert_that!(err.is_fatal(), eq(true));
    assert_that!(workspace.path().join("minified").exists(), eq(false));
}

#[rstest]
fn fail_policy_on_minified_side_creates_nothing(workspace: Workspace) {
    fs::write(workspace.path().join("minified"), "someone else's file").unwrap();
    let cfg = LocalizerConfig {
        collision: CollisionPolicy::Fail,
        ..workspace.config()
    };

    let err = batch::run_from_config(&cfg).unwrap_err();

    assert_that!(err.is_fatal(), eq(true));
    assert_that!(workspace.path().join("out").exists(), eq(false));
    assert_that!(
        fs::read_to_string(workspace.path().join("minified")).unwrap(),
        eq("someone else's file")
    );
}

#[rstest]
fn broken_translation_table_is_fatal_before_output(workspace: Workspace) {
    fs::write(workspace.path().join("translation_key.json"), "{\"de\": 1}").unwrap();

    let err = batch::run_from_config(&workspace.config()).unwrap_err();

    assert_that!(err.is_fatal(), eq(true));
    assert_that!(workspace.path().join("out").exists(), eq(false));
    assert_that!(workspace.path().join("minified").exists(), eq(false));
}

#[rstest]
fn cli_runs_batch_and_reports_counts(workspace: Workspace) {
    let output = Command::new(env!("CARGO_BIN_EXE_cookie-localizer"))
        .current_dir(workspace.path())
        .args(["--quiet", "localize", "--translate-keys"])
        .output()
        .unwrap();

    assert_that!(output.status.success(), eq(true));
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    assert_that!(stdout, contains_substring("Wrote 3 pretty files"));
    assert_that!(stdout, contains_substring("Wrote 3 minified files"));
    assert_that!(
        workspace.path().join("out/cookie_data_en-US.json").is_file(),
        eq(true)
    );
}

#[rstest]
fn cli_fails_on_missing_input(workspace: Workspace) {
    let output = Command::new(env!("CARGO_BIN_EXE_cookie-localizer"))
        .current_dir(workspace.path())
        .args(["localize", "--input", "missing.json", "--no-minified"])
        .output()
        .unwrap();

    assert_that!(output.status.success(), eq(false));
    assert_that!(workspace.path().join("out").exists(), eq(false));
    assert_that!(
        String::from_utf8_lossy(&output.stderr).into_owned(),
        contains_substring("missing.json")
    );
}
