//! Line-delimited JSON commands for driving the localizer from another
//! process. One request per line:
//! `{"id": ..., "cmd": "...", "payload": {...}}`.

use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use crate::model::config::{FieldKeyMap, LocalizerConfig, MatchMode};
use crate::services::translate::Translator;
use crate::services::{batch, config, loader, qa};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// Translation switches shared by the document commands.
#[derive(Debug, Default, Deserialize)]
struct Options {
    #[serde(default)]
    rename_keys: bool,
    #[serde(default)]
    case_insensitive: bool,
    #[serde(default)]
    field_keys: Option<FieldKeyMap>,
    #[serde(default)]
    token_pattern: Option<String>,
}

impl Options {
    fn from_payload(payload: &Value) -> Result<Self, String> {
        Options::deserialize(payload).map_err(|e| format!("invalid options: {e}"))
    }

    fn translator(self) -> Result<Translator, String> {
        let mut cfg = LocalizerConfig {
            rename_keys: self.rename_keys,
            match_mode: if self.case_insensitive {
                MatchMode::CaseInsensitive
            } else {
                MatchMode::Exact
            },
            ..LocalizerConfig::default()
        };
        if let Some(keys) = self.field_keys {
            cfg.field_keys = keys;
        }
        if let Some(pattern) = self.token_pattern {
            cfg.token_pattern = pattern;
        }
        Translator::from_config(&cfg).map_err(|e| e.to_string())
    }
}

fn required<'a>(payload: &'a Value, field: &str) -> Result<&'a Value, String> {
    payload
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| format!("payload.{field} is required"))
}

fn localize_string(payload: &Value) -> Result<Value, String> {
    let text = required(payload, "text")?
        .as_str()
        .ok_or_else(|| "payload.text must be a string".to_string())?;
    let (map, _) = loader::locale_map_from_value("payload", required(payload, "locale_map")?)
        .map_err(|e| e.to_string())?;
    let translator = Options::from_payload(payload)?.translator()?;

    let out = translator.substituter().substitute(text, &map);
    Ok(json!({ "text": out }))
}

fn localize_document(payload: &Value) -> Result<Value, String> {
    let document = required(payload, "document")?;
    let (table, _) =
        loader::table_from_value(required(payload, "translations")?).map_err(|e| e.to_string())?;
    let translator = Options::from_payload(payload)?.translator()?;

    let mut documents = Map::new();
    for (locale, map) in table.iter() {
        documents.insert(locale.to_string(), translator.translate(document, map));
    }
    Ok(json!({ "documents": documents }))
}

fn audit(payload: &Value) -> Result<Value, String> {
    let document = required(payload, "document")?;
    let (table, _) =
        loader::table_from_value(required(payload, "translations")?).map_err(|e| e.to_string())?;
    let translator = Options::from_payload(payload)?.translator()?;
    let auditor = qa::Auditor::new(document, &table, translator.substituter());

    let mut issues = Map::new();
    for (locale, map) in table.iter() {
        let (_, notes) = translator.translate_noted(document, map);
        let found = auditor.audit(locale, map, translator.substituter(), &notes);
        issues.insert(locale.to_string(), json!(found));
    }
    Ok(json!({
        "issues": issues,
        "shape": qa::check_shape(document),
    }))
}

fn run_batch(payload: &Value) -> Result<Value, String> {
    let cfg_val = payload.get("config").cloned().unwrap_or_else(|| json!({}));
    let cfg: LocalizerConfig =
        serde_json::from_value(cfg_val).map_err(|e| format!("invalid payload.config: {e}"))?;
    config::validate(&cfg).map_err(|e| e.to_string())?;

    let report = batch::run_from_config(&cfg).map_err(|e| e.to_string())?;
    serde_json::to_value(report).map_err(|e| e.to_string())
}

fn invalid_json() -> String {
    json!({
        "status": "error",
        "message": "invalid json"
    })
    .to_string()
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => return invalid_json(),
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    debug!(cmd = cmd_str, "request");

    let result = match Command::from(cmd_str) {
        Command::Ping => Ok(json!({ "message": "cookie-localizer alive" })),
        Command::LocalizeString => localize_string(payload),
        Command::LocalizeDocument => localize_document(payload),
        Command::Audit => audit(payload),
        Command::RunBatch => run_batch(payload),
        Command::Unknown => Err("unknown command".to_string()),
    };

    match result {
        Ok(body) => ok(id, body),
        Err(message) => err(id, message),
    }
}

/// Answers requests from `input` until it is exhausted or `output` closes.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W) -> io::Result<()> {
    for raw in input.split(b'\n') {
        let raw = raw?;

        // every non-blank line gets an answer, even one that is not text
        let response = match String::from_utf8(raw) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => answer(&line),
            Err(_) => invalid_json(),
        };

        writeln!(output, "{response}")?;
        output.flush()?;
    }

    Ok(())
}

fn answer(line: &str) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| handle(line))) {
        Ok(resp) => resp,
        Err(_) => {
            error!("request handler panicked");
            json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string()
        }
    }
}
