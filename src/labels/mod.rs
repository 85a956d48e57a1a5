//! Per-language label module generation.
//!
//! The label document lists anomalies with localized texts stored under
//! keys such as `text1-en`, `action-it` or `comment-fr`. This module
//! detects the languages present and writes one Python table per
//! language for the ESPHome component.

use crate::analysis::{is_truthy, json_eq};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Language used when a localized text is missing.
const FALLBACK_LANG: &str = "en";

/// Localized texts for one fault code.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    pub text1: Value,
    pub text2: Value,
    pub action: Value,
    pub comment: Value,
}

/// Fault code to texts, in first-seen code order.
pub type LabelTable = Vec<(Value, LabelEntry)>;

fn anomalies(lbl: &Value) -> impl Iterator<Item = &serde_json::Map<String, Value>> {
    lbl.get("anomalies")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Extract the language suffix of a key shaped `<prefix>-<ll>`.
fn language_suffix(key: &str) -> Option<&str> {
    let (prefix, lang) = key.rsplit_once('-')?;
    let valid = !prefix.is_empty()
        && lang.len() == 2
        && lang.bytes().all(|b| b.is_ascii_lowercase());
    valid.then_some(lang)
}

/// Languages present in the anomaly entries, sorted.
pub fn detect_languages(lbl: &Value) -> Vec<String> {
    let langs: BTreeSet<&str> = anomalies(lbl)
        .flat_map(|entry| entry.keys())
        .filter_map(|key| language_suffix(key))
        .collect();

    langs.into_iter().map(String::from).collect()
}

/// Pick `<field>-<lang>`, falling back to the default language.
fn localized(entry: &serde_json::Map<String, Value>, field: &str, lang: &str) -> Value {
    [lang, FALLBACK_LANG]
        .iter()
        .filter_map(|l| entry.get(&format!("{field}-{l}")))
        .find(|v| is_truthy(v))
        .cloned()
        .or_else(|| entry.get(&format!("{field}-{FALLBACK_LANG}")).cloned())
        .unwrap_or(Value::Null)
}

/// Build the fault code table for one language.
pub fn build_label_table(lbl: &Value, lang: &str) -> LabelTable {
    let mut table: LabelTable = Vec::new();

    for entry in anomalies(lbl) {
        let code = match entry.get("fault-code") {
            Some(code) if !code.is_null() => code,
            _ => continue,
        };

        let label = LabelEntry {
            text1: localized(entry, "text1", lang),
            text2: localized(entry, "text2", lang),
            action: localized(entry, "action", lang),
            comment: localized(entry, "comment", lang),
        };

        match table.iter_mut().find(|(existing, _)| json_eq(existing, code)) {
            Some((_, slot)) => *slot = label,
            None => table.push((code.clone(), label)),
        }
    }

    table
}

/// Render a JSON value as a Python literal.
fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        // JSON string escapes are all valid in Python string literals.
        Value::String(_) => value.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::from(k.as_str()), python_literal(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

/// Render the Python module for one language.
pub fn render_label_module(lang: &str, table: &LabelTable) -> String {
    let mut module = String::new();

    module.push_str(&format!(
        "\"\"\"Generated Immergas labels (language: {lang})\"\"\"\n"
    ));
    module.push('\n');
    module.push_str("immergas_labels = {\n");

    for (code, label) in table {
        module.push_str(&format!(
            "    {}: {{\"text1\": {}, \"text2\": {}, \"action\": {}, \"comment\": {}}},\n",
            python_literal(code),
            python_literal(&label.text1),
            python_literal(&label.text2),
            python_literal(&label.action),
            python_literal(&label.comment),
        ));
    }

    module.push_str("}\n");
    module
}

/// Write `labels_<lang>.py` for every detected language.
///
/// Returns the written paths; empty when the document has no localized keys.
pub fn generate_label_modules(lbl: &Value, dir: &Path) -> Result<Vec<PathBuf>> {
    let langs = detect_languages(lbl);
    if langs.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create labels directory: {}", dir.display()))?;

    let mut generated = Vec::with_capacity(langs.len());
    for lang in &langs {
        let table = build_label_table(lbl, lang);
        let path = dir.join(format!("labels_{lang}.py"));

        std::fs::write(&path, render_label_module(lang, &table))
            .with_context(|| format!("Failed to write label module: {}", path.display()))?;

        debug!("{} labels for language {}", table.len(), lang);
        generated.push(path);
    }

    info!("Generated {} label modules", generated.len());
    Ok(generated)
}
