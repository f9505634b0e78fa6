//! Document loading: bytes to generic tree.
//!
//! The loader sniffs JSON vs YAML from the first non-whitespace byte,
//! deserializes into the ordered generic tree, and can record a best-effort
//! source map of JSON-pointer locations to line numbers for diagnostics.

use crate::error::Error;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Detected serialization format of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sniff the format: first non-whitespace byte `{` or `[` means JSON,
/// anything else is treated as YAML.
#[must_use]
pub fn sniff_format(content: &str) -> SourceFormat {
    match content.trim_start().as_bytes().first() {
        Some(b'{' | b'[') => SourceFormat::Json,
        _ => SourceFormat::Yaml,
    }
}

/// Deserialize source text into the generic tree.
///
/// The sniffed format is tried first; the other format is used as a
/// fallback so that, for example, JSON embedded in a `.yaml` file still
/// loads. The error reported is the one from the sniffed format.
///
/// # Errors
///
/// Returns the underlying syntax error when neither format parses.
pub fn load_tree(content: &str) -> Result<(Value, SourceFormat), Error> {
    let format = sniff_format(content);
    match format {
        SourceFormat::Json => match serde_json::from_str::<Value>(content) {
            Ok(value) => Ok((value, format)),
            Err(json_err) => serde_yaml::from_str::<Value>(content)
                .map(|value| (value, SourceFormat::Yaml))
                .map_err(|_| Error::Json(json_err)),
        },
        SourceFormat::Yaml => match serde_yaml::from_str::<Value>(content) {
            Ok(value) => Ok((value, format)),
            Err(yaml_err) => serde_json::from_str::<Value>(content)
                .map(|value| (value, SourceFormat::Json))
                .map_err(|_| Error::Yaml(yaml_err)),
        },
    }
}

/// Read a file and deserialize it into the generic tree.
///
/// # Errors
///
/// Returns an I/O error when the file cannot be read, or a syntax error
/// when its content parses as neither YAML nor JSON.
pub fn load_file(path: &Path) -> Result<(String, Value, SourceFormat), Error> {
    let content = std::fs::read_to_string(path)?;
    let (value, format) = load_tree(&content)?;
    Ok((content, value, format))
}

/// Serialize a generic tree back to text in the given format.
///
/// # Errors
///
/// Returns a serialization error from the underlying format writer.
pub fn emit_tree(value: &Value, format: SourceFormat) -> Result<String, Error> {
    match format {
        SourceFormat::Json => {
            let mut text = serde_json::to_string_pretty(value)?;
            text.push('\n');
            Ok(text)
        }
        SourceFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

/// Best-effort index of JSON-pointer locations to 1-based line numbers.
///
/// Built from a single scan of the source text; used for diagnostics only.
/// YAML locations are derived from indentation, JSON locations from key
/// nesting, so deeply quoted or flow-style constructs may be missed.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    lines: HashMap<String, usize>,
}

impl SourceMap {
    /// Look up the line of a JSON pointer (e.g. `/paths/~1pets/get`).
    #[must_use]
    pub fn line_of(&self, pointer: &str) -> Option<usize> {
        self.lines.get(pointer).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Scan source text and build the pointer index.
    #[must_use]
    pub fn build(content: &str, format: SourceFormat) -> Self {
        match format {
            SourceFormat::Yaml => Self::build_yaml(content),
            SourceFormat::Json => Self::build_json(content),
        }
    }

    fn build_yaml(content: &str) -> Self {
        let mut lines = HashMap::new();
        // Stack of (indent, escaped key) for the current mapping chain.
        let mut stack: Vec<(usize, String)> = Vec::new();
        for (idx, raw) in content.lines().enumerate() {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
                continue;
            }
            let Some(colon) = find_key_colon(trimmed) else {
                continue;
            };
            let indent = raw.len() - trimmed.len();
            let key = unquote(trimmed[..colon].trim());
            while stack.last().is_some_and(|(depth, _)| *depth >= indent) {
                stack.pop();
            }
            stack.push((indent, escape_pointer(&key)));
            let pointer: String = stack
                .iter()
                .map(|(_, segment)| format!("/{segment}"))
                .collect();
            lines.entry(pointer).or_insert(idx + 1);
        }
        Self { lines }
    }

    fn build_json(content: &str) -> Self {
        let mut lines = HashMap::new();
        // Object-key path of the current position; array levels and the root
        // object push an empty marker so pops stay balanced.
        let mut stack: Vec<String> = Vec::new();
        let mut line = 1usize;
        let mut pending_key: Option<String> = None;
        let mut chars = content.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\n' => line += 1,
                '"' => {
                    let mut text = String::new();
                    let mut escaped = false;
                    for next in chars.by_ref() {
                        if escaped {
                            text.push(next);
                            escaped = false;
                        } else if next == '\\' {
                            escaped = true;
                        } else if next == '"' {
                            break;
                        } else {
                            if next == '\n' {
                                line += 1;
                            }
                            text.push(next);
                        }
                    }
                    // Whitespace is insignificant here; consume it to see
                    // whether a ':' follows, which makes the string a key.
                    while chars.peek().is_some_and(|c| c.is_whitespace()) {
                        if chars.next() == Some('\n') {
                            line += 1;
                        }
                    }
                    if chars.peek() == Some(&':') {
                        chars.next();
                        let key = escape_pointer(&text);
                        let mut pointer: String = stack
                            .iter()
                            .filter(|segment| !segment.is_empty())
                            .map(|segment| format!("/{segment}"))
                            .collect();
                        pointer.push('/');
                        pointer.push_str(&key);
                        lines.entry(pointer).or_insert(line);
                        pending_key = Some(key);
                    }
                }
                '{' => stack.push(pending_key.take().unwrap_or_default()),
                '}' => {
                    stack.pop();
                }
                '[' | ',' => pending_key = None,
                _ => {}
            }
        }
        Self { lines }
    }
}

fn find_key_colon(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    for (idx, &byte) in bytes.iter().enumerate() {
        match byte {
            b'\'' if !in_double => in_single = !in_single,
            b'"' if !in_single => in_double = !in_double,
            b':' if !in_single && !in_double => {
                if bytes.get(idx + 1).is_none_or(|&next| next == b' ') {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn unquote(text: &str) -> String {
    let stripped = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            text.strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        });
    stripped.unwrap_or(text).to_string()
}

/// Escape a map key for use in a JSON pointer segment.
#[must_use]
pub fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format("  {\"a\": 1}"), SourceFormat::Json);
        assert_eq!(sniff_format("[1, 2]"), SourceFormat::Json);
        assert_eq!(sniff_format("openapi: 3.0.0"), SourceFormat::Yaml);
    }

    #[test]
    fn test_load_tree_preserves_integers() {
        let (tree, format) = load_tree("maximum: 100\nratio: 0.5\n").unwrap();
        assert_eq!(format, SourceFormat::Yaml);
        assert!(tree["maximum"].is_i64() || tree["maximum"].is_u64());
        assert!(tree["ratio"].is_f64());
    }

    #[test]
    fn test_load_tree_json_in_yaml_file() {
        // Sniffed as YAML (leading comment) but actually loads fine as YAML 1.2 JSON.
        let (tree, _) = load_tree("# spec\n{\"openapi\": \"3.0.0\"}\n").unwrap();
        assert_eq!(tree["openapi"], "3.0.0");
    }

    #[test]
    fn test_emit_tree_round_trip() {
        let (tree, _) = load_tree("a: 1\nb:\n  c: text\n").unwrap();
        let emitted = emit_tree(&tree, SourceFormat::Yaml).unwrap();
        let (reloaded, _) = load_tree(&emitted).unwrap();
        assert_eq!(tree, reloaded);
    }

    #[test]
    fn test_yaml_key_order_preserved() {
        let (tree, _) = load_tree("zebra: 1\nalpha: 2\nmiddle: 3\n").unwrap();
        let keys: Vec<&String> = tree.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zebra", "alpha", "middle"]);
    }

    #[test]
    fn test_source_map_yaml() {
        let content = "openapi: 3.0.0\ninfo:\n  title: Test\n  version: 1.0.0\npaths: {}\n";
        let map = SourceMap::build(content, SourceFormat::Yaml);
        assert_eq!(map.line_of("/openapi"), Some(1));
        assert_eq!(map.line_of("/info"), Some(2));
        assert_eq!(map.line_of("/info/title"), Some(3));
        assert_eq!(map.line_of("/paths"), Some(5));
    }

    #[test]
    fn test_source_map_escapes_slash_keys() {
        let content = "paths:\n  /pets:\n    get: {}\n";
        let map = SourceMap::build(content, SourceFormat::Yaml);
        assert_eq!(map.line_of("/paths/~1pets"), Some(2));
    }
}
