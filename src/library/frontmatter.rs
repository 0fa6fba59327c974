//! Line-oriented frontmatter parsing and rendering.
//!
//! Documents look like this:
//!
//! ```text
//! ---
//! topic_number: 5
//! title: "Cabin smoke"
//! keywords:
//!   - "smoke"
//!   - "cabin"
//! ---
//!
//! # Cabin smoke
//! ```
//!
//! Each metadata line is split on its first colon. The value is read as a
//! JSON literal when possible (numbers, booleans, quoted strings, arrays);
//! otherwise one layer of surrounding quotes is stripped and the rest is
//! kept as plain text. Only the first colon of a line separates key and
//! value; there is no escaping beyond doubled quotes inside single-quoted
//! values.

use serde_json::Value;
use thiserror::Error;

use crate::domain::topic::{normalize_keywords, split_keywords};

/// Marker line opening and closing the metadata block
pub const DELIMITER: &str = "---";

/// Why a document could not be split into metadata and body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontmatterError {
    #[error("Document does not start with a '---' metadata block")]
    MissingOpening,

    #[error("Metadata block is not closed by a '---' line")]
    Unterminated,
}

/// Parsed metadata plus the remaining Markdown body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    fields: Vec<(String, Value)>,
    body: String,
}

impl Frontmatter {
    /// Create an empty frontmatter around `body`
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            fields: Vec::new(),
            body: body.into(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, replacing an existing value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Field rendered as text.
    ///
    /// Strings come back as-is, numbers and booleans in their literal form.
    /// Null and empty lists count as absent.
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::Array(items) if items.is_empty() => None,
            value => Some(value_text(value)),
        }
    }

    /// Field read as an integer, accepting numeric strings
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Field read as an ordered list of trimmed strings.
    ///
    /// Accepts either a list or a comma-separated string.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => normalize_keywords(items.iter().map(value_text)),
            Some(Value::String(s)) => split_keywords(s),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => normalize_keywords([value_text(other)]),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// Render back into the document format
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');

        for (key, value) in &self.fields {
            match value {
                Value::Array(items) if !items.is_empty() => {
                    out.push_str(key);
                    out.push_str(":\n");
                    for item in items {
                        out.push_str("  - ");
                        out.push_str(&render_scalar(item));
                        out.push('\n');
                    }
                }
                _ => {
                    out.push_str(key);
                    out.push_str(": ");
                    out.push_str(&render_scalar(value));
                    out.push('\n');
                }
            }
        }

        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out.push_str(&self.body);
        if !self.body.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Split a raw document into metadata and body
pub fn parse(raw: &str) -> Result<Frontmatter, FrontmatterError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = raw.split_inclusive('\n');
    let mut offset = 0;

    let mut opened = false;
    for line in lines.by_ref() {
        offset += line.len();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == DELIMITER {
            opened = true;
            break;
        }
        return Err(FrontmatterError::MissingOpening);
    }
    if !opened {
        return Err(FrontmatterError::MissingOpening);
    }

    let mut block = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        offset += line.len();
        if line.trim() == DELIMITER {
            closed = true;
            break;
        }
        block.push(line.trim_end_matches(|c: char| c == '\n' || c == '\r'));
    }
    if !closed {
        return Err(FrontmatterError::Unterminated);
    }

    let body = raw[offset..]
        .trim_start_matches(|c: char| c == '\n' || c == '\r')
        .trim_end()
        .to_string();

    Ok(Frontmatter {
        fields: parse_block(&block),
        body,
    })
}

fn parse_block(lines: &[&str]) -> Vec<(String, Value)> {
    let mut fields: Vec<(String, Value)> = Vec::new();
    // Index of a key whose value is an indented `- item` list
    let mut open_list: Option<usize> = None;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some((_, Value::Array(items))) = open_list.and_then(|i| fields.get_mut(i)) {
                items.push(parse_value(item.trim()));
            }
            continue;
        }

        open_list = None;
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = value.trim();
        let parsed = if value.is_empty() {
            Value::Array(Vec::new())
        } else {
            parse_value(value)
        };

        let index = match fields.iter().position(|(k, _)| k == key) {
            Some(i) => {
                fields[i].1 = parsed;
                i
            }
            None => {
                fields.push((key.to_string(), parsed));
                fields.len() - 1
            }
        };
        if value.is_empty() {
            open_list = Some(index);
        }
    }

    fields
}

/// Interpret a value as a JSON literal, falling back to unquoted text
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(strip_quotes(raw)))
}

fn strip_quotes(raw: &str) -> String {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            let inner = &raw[1..raw.len() - 1];
            let doubled = format!("{quote}{quote}");
            return inner.replace(&doubled, &quote.to_string());
        }
    }
    raw.to_string()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_scalar(value: &Value) -> String {
    // serde_json output is a valid literal for `parse_value`
    value.to_string()
}
