//! Generated module statements.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

static EXPORT_NAME: OnceLock<Option<Regex>> = OnceLock::new();

/// Whether `name` is a plain JavaScript identifier usable as an export binding.
pub fn is_export_name(name: &str) -> bool {
    EXPORT_NAME
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// `export <name> from '<url>'`
pub fn export_from(name: &str, url: &str) -> String {
    format!("export {} from '{}'", name, quote(url))
}

/// `export layout from '<url>'`
pub fn layout_export(url: &str) -> String {
    export_from("layout", url)
}

/// `export const metadata = {...}` for page-level consumers.
///
/// Carries `title`, `description`, and `keywords` from the plain metadata when
/// present, followed by every linked entry. A comma separated keyword string
/// is split into an array.
pub fn metadata_export(plain: &Map<String, Value>, linked: &Map<String, Value>) -> String {
    let mut metadata = Map::new();

    for key in ["title", "description"] {
        if let Some(value) = plain.get(key) {
            metadata.insert(key.to_string(), value.clone());
        }
    }
    if let Some(keywords) = plain.get("keywords") {
        metadata.insert("keywords".to_string(), keyword_array(keywords));
    }
    for (key, value) in linked {
        metadata.insert(key.clone(), value.clone());
    }

    let json = serde_json::to_string_pretty(&Value::Object(metadata)).unwrap_or_else(|_| "{}".to_string());
    format!("export const metadata = {json}")
}

fn keyword_array(value: &Value) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        Value::String(s) => Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| Value::String(k.to_string()))
                .collect(),
        ),
        other => Value::Array(vec![other.clone()]),
    }
}

// Single-quoted JS string literal body
fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
