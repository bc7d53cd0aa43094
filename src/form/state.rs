//! Form state snapshot and field value objects

use std::collections::HashMap;
use thiserror::Error;

/// A value submitted to a field validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Pixel dimensions probed from an image before upload
    Dimensions { width: u32, height: u32 },
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Text content, or an empty string for non-text values
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Dimensions { .. } => "",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

/// Validation failure for a single field, shown inline under the input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Values most recently validated, keyed by field name
pub type FormValues = HashMap<String, FieldValue>;

/// Snapshot of one form's validation state.
///
/// Owned by a single `FormValidator` and only mutated through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub values: FormValues,
    pub errors: HashMap<String, FieldError>,
    pub pristine: HashMap<String, bool>,
    pub required: HashMap<String, bool>,
    pub changed: bool,
    pub valid: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            errors: HashMap::new(),
            pristine: HashMap::new(),
            required: HashMap::new(),
            changed: false,
            valid: true,
        }
    }
}

impl FormState {
    /// A field nobody has validated yet counts as pristine
    pub fn is_pristine(&self, name: &str) -> bool {
        self.pristine.get(name).copied().unwrap_or(true)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.get(name).copied().unwrap_or(false)
    }

    pub fn error(&self, name: &str) -> Option<&FieldError> {
        self.errors.get(name)
    }

    /// Error to display: only once the field has been touched
    pub fn visible_error(&self, name: &str) -> Option<&FieldError> {
        if self.is_pristine(name) {
            None
        } else {
            self.error(name)
        }
    }

    #[cfg(test)]
    pub fn text(&self, name: &str) -> &str {
        self.values.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    /// Recompute `valid` from the required fields' errors
    pub(super) fn recompute_valid(&mut self) {
        self.valid = !self
            .errors
            .keys()
            .any(|name| self.required.get(name).copied().unwrap_or(false));
    }
}
