//! Field annotations and the `key:"payload"` declaration syntax.
//!
//! A tag is a space-separated list of `key:"payload"` pairs, for example
//! `json:"email" validate:"^[\\w.-]+@[\\w-]+\\.[a-z]{2,4}$"`. Payloads are
//! double-quoted strings; backslash escapes inside them are decoded, so a
//! regex escape like `\d` is written `\\d` in the tag.
//!
//! Recognised escapes are `\\`, `\"`, `\a \b \f \n \r \t \v`, `\xHH`,
//! three-digit octal `\NNN` (at most `\377`), `\uHHHH` and `\UHHHHHHHH`.
//! Hex and octal escapes name a code point, not a raw byte, so `\xe9` decodes
//! to `é`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnnotationError {
    #[error("malformed annotation key at offset {0}")]
    MalformedKey(usize),

    #[error("annotation '{0}' is missing its quoted payload")]
    MissingQuote(String),

    #[error("unterminated payload for annotation '{0}'")]
    UnterminatedPayload(String),

    #[error("invalid escape '\\{escape}' in annotation '{key}'")]
    InvalidEscape { key: String, escape: String },
}

/// Ordered key/payload pairs attached to a struct field.
///
/// Duplicate keys are kept; [`lookup`](Self::lookup) returns the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    entries: Vec<(String, String)>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key/payload pair.
    pub fn with(mut self, key: impl Into<String>, payload: impl Into<String>) -> Self {
        self.entries.push((key.into(), payload.into()));
        self
    }

    /// Parses a tag string such as `conf:"HTTP_MAX_RETRIES" json:"retries"`.
    pub fn parse(tag: &str) -> Result<Self, AnnotationError> {
        let bytes = tag.as_bytes();
        let mut entries = Vec::new();
        let mut pos = 0;

        loop {
            while pos < bytes.len() && bytes[pos] == b' ' {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }

            let key_start = pos;
            while pos < bytes.len() && is_key_byte(bytes[pos]) {
                pos += 1;
            }
            if pos == key_start || pos >= bytes.len() || bytes[pos] != b':' {
                return Err(AnnotationError::MalformedKey(key_start));
            }
            let key = &tag[key_start..pos];
            pos += 1;

            if pos >= bytes.len() || bytes[pos] != b'"' {
                return Err(AnnotationError::MissingQuote(key.to_string()));
            }
            pos += 1;

            let payload_start = pos;
            while pos < bytes.len() && bytes[pos] != b'"' {
                if bytes[pos] == b'\\' {
                    pos += 1;
                }
                pos += 1;
            }
            if pos >= bytes.len() {
                return Err(AnnotationError::UnterminatedPayload(key.to_string()));
            }
            let payload = unescape(key, &tag[payload_start..pos])?;
            pos += 1;

            entries.push((key.to_string(), payload));
        }

        Ok(Self { entries })
    }

    /// Returns the payload of the first annotation named `key`.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn is_key_byte(b: u8) -> bool {
    b > b' ' && b != b':' && b != b'"' && b != 0x7f
}

/// Decodes backslash escapes in a payload.
fn unescape(key: &str, raw: &str) -> Result<String, AnnotationError> {
    let invalid = |escape: String| AnnotationError::InvalidEscape {
        key: key.to_string(),
        escape,
    };

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err(invalid(String::new()));
        };
        match esc {
            '\\' => result.push('\\'),
            '"' => result.push('"'),
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            'a' => result.push('\u{07}'),
            'b' => result.push('\u{08}'),
            'f' => result.push('\u{0c}'),
            'v' => result.push('\u{0b}'),
            'x' | 'u' | 'U' => {
                let width = match esc {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.by_ref().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(format!("{esc}{digits}")))?;
                result.push(decoded);
            }
            '0'..='7' => {
                let digits: String = std::iter::once(esc).chain(chars.by_ref().take(2)).collect();
                let decoded = (digits.len() == 3)
                    .then(|| u8::from_str_radix(&digits, 8).ok())
                    .flatten()
                    .map(char::from)
                    .ok_or_else(|| invalid(digits.clone()))?;
                result.push(decoded);
            }
            other => return Err(invalid(other.to_string())),
        }
    }

    Ok(result)
}
