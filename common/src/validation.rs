use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum nickname length, in UTF-16 code units as the web form counts them.
pub const NICKNAME_MAX_UNITS: usize = 20;

/// Field-level validation failures, keyed by the form field name.
///
/// Messages are the inline texts shown next to the offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Record `message` under `field` when the trimmed value is empty.
    /// Returns true if the value was present.
    pub fn require(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.insert(field, message);
            false
        } else {
            true
        }
    }

    /// Required phone number: must be present and match `^[0-9-]+$`.
    pub fn require_phone(&mut self, field: &str, value: &str) {
        if self.require(field, value, "電話番号を入力してください") && !is_valid_phone(value) {
            self.insert(field, "正しい電話番号を入力してください");
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str(" / ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// `^[0-9-]+$`
pub fn is_valid_phone(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// `^\d+$`
pub fn is_valid_age(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`: one `@`, no whitespace, and a dot in the
/// domain with at least one character on each side.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validate a nickname for session setup. Returns the trimmed nickname.
pub fn validate_nickname(raw: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    let nickname = raw.trim();
    if nickname.is_empty() {
        errors.insert("nickname", "ニックネームを入力してください");
    } else if nickname.encode_utf16().count() > NICKNAME_MAX_UNITS {
        errors.insert("nickname", "ニックネームは20文字以内で入力してください");
    }
    errors.into_result(nickname.to_string())
}

/// Validate free-form content. Returns the trimmed content.
pub fn validate_content(raw: &str, message: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require("content", raw, message);
    errors.into_result(raw.trim().to_string())
}
