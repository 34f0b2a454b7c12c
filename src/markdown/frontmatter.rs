//! Lenient frontmatter parsing.
//!
//! The preamble is a block opened by a `---` line at the very start of the
//! document and closed by the next `---` line. `gray_matter` extracts its text;
//! the body is everything after the closing delimiter line, byte for byte. A
//! document whose opening block is never closed has no preamble at all.
//!
//! The preamble is read entry by entry rather than handed to a YAML parser as
//! a whole, so one malformed entry costs only that entry instead of the whole
//! document's metadata. Each top-level `key: value` line is interpreted as:
//!
//! - `{…}` or `[…]`: structured data (JSON, falling back to YAML flow syntax)
//! - `"…"` or `'…'`: the string between the quotes
//! - anything else: the raw string
//!
//! A key with no inline value takes the indented lines (or `- item` lines)
//! that follow it as a YAML block:
//!
//! ```yaml
//! components:
//!   Button: react-button
//!   Card: ./Card
//! ```
//!
//! Blank lines, `#` comments, lines without a colon, indented lines that do not
//! belong to a block, and values that fail to parse are skipped.

use gray_matter::{
    Matter, Pod,
    engine::Engine,
};
use serde_json::{Map, Value};
use tracing::warn;

const DELIMITER: &str = "---";

/// Custom gray_matter engine that returns raw frontmatter text without parsing.
///
/// Entry-level interpretation happens in [`parse_preamble`].
struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// Byte offset just past the closing delimiter line, if `text` opens with a
/// closed preamble.
fn body_offset(text: &str) -> Option<usize> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if line.trim_end() == DELIMITER {
            return Some(offset);
        }
    }
    None
}

/// Split raw document text into its preamble (if any) and body.
///
/// The body is a verbatim slice of `text`; without a closed preamble it is
/// the whole of `text`.
pub fn split_preamble(text: &str) -> (Option<String>, String) {
    let Some(offset) = body_offset(text) else {
        return (None, text.to_string());
    };

    let matter = Matter::<RawFrontmatter>::new();
    match matter.parse::<String>(&text[..offset]) {
        Ok(result) => (result.data.filter(|raw| !raw.trim().is_empty()), text[offset..].to_string()),
        Err(e) => {
            warn!("Unable to read frontmatter, treating whole document as body: {}", e);
            (None, text.to_string())
        }
    }
}

/// A top-level entry and the block lines that follow it.
struct Entry<'a> {
    line: usize,
    key: &'a str,
    value: &'a str,
    block: Vec<&'a str>,
}

fn is_block_line(line: &str) -> bool {
    line.starts_with([' ', '\t']) || line == "-" || line.starts_with("- ")
}

/// Parse a preamble into an ordered key → value map.
pub fn parse_preamble(raw: &str) -> Map<String, Value> {
    let mut entries = Map::new();
    let mut pending: Option<Entry<'_>> = None;

    for (index, line) in raw.lines().enumerate() {
        let number = index + 1;

        if line.trim().is_empty() {
            if let Some(entry) = pending.as_mut() {
                entry.block.push("");
            }
            continue;
        }
        if is_block_line(line) {
            match pending.as_mut() {
                Some(entry) => entry.block.push(line),
                None => warn!("Skipping frontmatter line {}: indented line without a key", number),
            }
            continue;
        }

        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }

        if let Some(entry) = pending.take() {
            finish(entry, &mut entries);
        }

        let Some((key, value)) = line.split_once(':') else {
            warn!("Skipping frontmatter line {}: expected 'key: value'", number);
            continue;
        };

        let key = unquote(key.trim());
        if key.is_empty() {
            warn!("Skipping frontmatter line {}: empty key", number);
            continue;
        }

        pending = Some(Entry {
            line: number,
            key,
            value: value.trim(),
            block: Vec::new(),
        });
    }

    if let Some(entry) = pending {
        finish(entry, &mut entries);
    }
    entries
}

fn finish(entry: Entry<'_>, entries: &mut Map<String, Value>) {
    let has_block = entry.block.iter().any(|line| !line.trim().is_empty());

    let value = if !has_block {
        parse_value(entry.value)
    } else if entry.value.is_empty() {
        parse_block(entry.key, &entry.block)
    } else {
        warn!(
            "Skipping indented lines after frontmatter line {}: '{}' already has a value",
            entry.line, entry.key
        );
        parse_value(entry.value)
    };

    match value {
        Some(value) => {
            entries.insert(entry.key.to_string(), value);
        }
        None => warn!("Skipping frontmatter line {}: malformed value for '{}'", entry.line, entry.key),
    }
}

/// Parse `key:` followed by its block lines as a single YAML mapping entry.
fn parse_block(key: &str, block: &[&str]) -> Option<Value> {
    let quoted = serde_json::to_string(key).ok()?;
    let yaml = format!("{quoted}:\n{}", block.join("\n"));
    let mut parsed: Map<String, Value> = serde_yaml::from_str(&yaml).ok()?;
    parsed.remove(key)
}

/// Interpret a single inline frontmatter value.
///
/// Returns `None` only for structured values that parse as neither JSON nor YAML.
pub fn parse_value(raw: &str) -> Option<Value> {
    if raw.starts_with('{') || raw.starts_with('[') {
        return serde_json::from_str(raw).ok().or_else(|| serde_yaml::from_str(raw).ok());
    }
    Some(Value::String(unquote(raw).to_string()))
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
