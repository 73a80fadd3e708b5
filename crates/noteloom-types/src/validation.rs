use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 255;
pub const CONTENT_MIN_CHARS: usize = 10;

/// Field name -> messages, in a stable order so responses are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    // -- Rules --

    /// Returns false (and records an error) when the value is blank.
    pub fn require(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, format!("The {} field is required.", field));
            return false;
        }
        true
    }

    pub fn min_chars(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.add(field, format!("The {} field must be at least {} characters.", field, min));
        }
    }

    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(
                field,
                format!("The {} field must not be greater than {} characters.", field, max),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !looks_like_email(value) {
            self.add(field, format!("The {} field must be a valid email address.", field));
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self
            .fields
            .values()
            .flat_map(|messages| messages.iter().map(String::as_str))
            .collect();
        write!(f, "validation failed: {}", messages.join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Fields a user submits when creating or editing a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_important: bool,
}

impl NoteInput {
    /// Trims surrounding whitespace and checks the length rules: title 3 to
    /// 255 characters, content at least 10.
    pub fn validated(self) -> Result<NoteInput, ValidationErrors> {
        let input = NoteInput {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            is_important: self.is_important,
        };

        let mut errors = ValidationErrors::new();
        if errors.require("title", &input.title) {
            errors.min_chars("title", &input.title, TITLE_MIN_CHARS);
            errors.max_chars("title", &input.title, TITLE_MAX_CHARS);
        }
        if errors.require("content", &input.content) {
            errors.min_chars("content", &input.content, CONTENT_MIN_CHARS);
        }

        errors.into_result().map(|()| input)
    }
}
