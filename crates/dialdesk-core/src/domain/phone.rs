use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dialable number in canonical form: ASCII digits with an optional leading
/// `+`. Two inputs that differ only in formatting normalize to the same value,
/// which is what per-tenant uniqueness is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.trim().is_empty() {
            return Err(CoreError::EmptyPhoneNumber);
        }
        normalize_phone_number(raw)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidPhoneNumber(raw.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Letter-based extension markers, longest first.
const EXTENSION_WORDS: [&str; 4] = ["extension", "ext.", "ext", "x"];

/// Canonical dialable form of `value`, or `None` when it has no digits or
/// carries letters that are not an extension marker. Vanity numbers such as
/// `1-800-FLOWERS` are rejected rather than truncated.
pub fn normalize_phone_number(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let number = strip_extension(trimmed)?;

    let mut out = String::new();
    let mut saw_digit = false;

    if number.starts_with('+') {
        out.push('+');
    }

    for ch in number.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
            saw_digit = true;
        }
    }

    if !saw_digit {
        return None;
    }

    Some(out)
}

/// Splits off a trailing extension and returns the number part.
fn strip_extension(value: &str) -> Option<&str> {
    let Some(index) = value.find(|ch: char| ch.is_alphabetic() || matches!(ch, '#' | ';' | ','))
    else {
        return Some(value);
    };
    let (number, rest) = value.split_at(index);

    if rest.starts_with(|ch: char| ch.is_alphabetic()) {
        // x89, ext 89, ext. 89: the marker must be followed by digits only
        let lower = rest.to_ascii_lowercase();
        let word = EXTENSION_WORDS
            .iter()
            .find(|word| lower.starts_with(**word))?;
        let digits = &rest[word.len()..];
        let valid = digits.chars().any(|ch| ch.is_ascii_digit())
            && digits
                .chars()
                .all(|ch| ch.is_ascii_digit() || ch.is_whitespace());
        if !valid {
            return None;
        }
    } else if rest.chars().any(char::is_alphabetic) {
        return None;
    }

    Some(number)
}
