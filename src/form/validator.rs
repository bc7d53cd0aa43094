//! Field registration and per-field validation

use std::fmt;
use std::sync::Arc;

use super::state::{FieldError, FieldValue, FormState, FormValues};

/// Validation function. Receives the candidate value and the values
/// validated so far for the other fields.
pub type ValidateFn = Arc<dyn Fn(&FieldValue, &FormValues) -> Option<FieldError> + Send + Sync>;

/// Registration options for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions {
    pub required: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self { required: true }
    }
}

struct FieldSpec {
    name: String,
    required: bool,
    validate: ValidateFn,
}

/// Owns a form's registered fields and its `FormState`
#[derive(Default)]
pub struct FormValidator {
    specs: Vec<FieldSpec>,
    state: FormState,
}

impl fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormValidator")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("state", &self.state)
            .finish()
    }
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a required field
    pub fn field<F>(&mut self, name: &str, validate: F) -> &mut Self
    where
        F: Fn(&FieldValue, &FormValues) -> Option<FieldError> + Send + Sync + 'static,
    {
        self.field_with(name, FieldOptions::default(), validate)
    }

    /// Register a field with explicit options.
    ///
    /// Registering a name twice replaces the earlier spec but keeps its
    /// position in registration order.
    pub fn field_with<F>(&mut self, name: &str, options: FieldOptions, validate: F) -> &mut Self
    where
        F: Fn(&FieldValue, &FormValues) -> Option<FieldError> + Send + Sync + 'static,
    {
        let spec = FieldSpec {
            name: name.to_string(),
            required: options.required,
            validate: Arc::new(validate),
        };
        match self.specs.iter_mut().find(|s| s.name == name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
        self.state
            .required
            .insert(name.to_string(), options.required);
        self.state.pristine.entry(name.to_string()).or_insert(true);
        self
    }

    /// Validate `value` for `name` and record the outcome.
    ///
    /// Unknown names leave the state untouched.
    pub fn validate(&mut self, name: &str, value: impl Into<FieldValue>) {
        let Some(spec) = self.specs.iter().find(|s| s.name == name) else {
            tracing::debug!("validate called for unregistered field {}", name);
            return;
        };
        let value = value.into();
        let outcome = (spec.validate)(&value, &self.state.values);

        match outcome {
            Some(err) => {
                self.state.errors.insert(name.to_string(), err);
            }
            None => {
                self.state.errors.remove(name);
            }
        }
        self.state.pristine.insert(name.to_string(), false);
        self.state.values.insert(name.to_string(), value);
        self.state.changed = true;
        self.state.recompute_valid();
    }

    /// Clear values and errors; registered fields are kept
    pub fn reset(&mut self) {
        self.state.values.clear();
        self.state.errors.clear();
        for spec in &self.specs {
            self.state.pristine.insert(spec.name.clone(), true);
        }
        self.state.changed = false;
        self.state.valid = true;
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Field names in registration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    /// Required field names in registration order
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(|s| s.required)
            .map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn required_text(
        message: &'static str,
    ) -> impl Fn(&FieldValue, &FormValues) -> Option<FieldError> + Send + Sync + 'static {
        move |value, _| {
            if value.as_text().is_empty() {
                Some(FieldError::new(message))
            } else {
                None
            }
        }
    }

    fn login_validator() -> FormValidator {
        let mut v = FormValidator::new();
        v.field("email", required_text("Email is required"))
            .field("password", required_text("Password is required"));
        v
    }

    mod registration {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_fields_start_pristine_and_valid() {
            let v = login_validator();
            assert!(v.state().valid);
            assert!(!v.state().changed);
            assert!(v.state().is_pristine("email"));
            assert!(v.state().is_required("password"));
        }

        #[test]
        fn test_registration_order_preserved() {
            let v = login_validator();
            assert_eq!(v.field_names().collect::<Vec<_>>(), vec!["email", "password"]);
        }

        #[test]
        fn test_optional_field_not_in_required() {
            let mut v = login_validator();
            v.field_with("bio", FieldOptions { required: false }, |_, _| None);
            assert_eq!(
                v.required_fields().collect::<Vec<_>>(),
                vec!["email", "password"]
            );
            assert!(v.field_names().any(|n| n == "bio"));
        }

        #[test]
        fn test_reregister_keeps_position() {
            let mut v = login_validator();
            v.field("email", |_, _| None);
            assert_eq!(v.field_names().collect::<Vec<_>>(), vec!["email", "password"]);
            v.validate("email", "");
            assert!(v.state().error("email").is_none());
        }
    }

    mod validate {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_required_empty_sets_error_and_invalidates() {
            let mut v = login_validator();
            v.validate("email", "");
            assert_eq!(
                v.state().error("email").map(|e| e.message.as_str()),
                Some("Email is required")
            );
            assert!(!v.state().valid);
            assert!(!v.state().is_pristine("email"));
            assert!(v.state().changed);
        }

        #[test]
        fn test_error_cleared_on_good_value() {
            let mut v = login_validator();
            v.validate("email", "");
            v.validate("email", "a@b.co");
            assert!(v.state().error("email").is_none());
            assert!(v.state().valid);
            assert_eq!(v.state().text("email"), "a@b.co");
        }

        #[test]
        fn test_idempotent_for_same_value() {
            let mut v = login_validator();
            v.validate("email", "");
            let first = v.state().clone();
            v.validate("email", "");
            assert_eq!(&first, v.state());
        }

        #[test]
        fn test_unknown_field_is_noop() {
            let mut v = login_validator();
            let before = v.state().clone();
            v.validate("nickname", "x");
            assert_eq!(&before, v.state());
        }

        #[test]
        fn test_optional_error_kept_but_form_valid() {
            let mut v = FormValidator::new();
            v.field_with("bio", FieldOptions { required: false }, |value, _| {
                if value.as_text().chars().count() > 5 {
                    Some(FieldError::new("Bio is too long"))
                } else {
                    None
                }
            });
            v.validate("bio", "far too long");
            assert!(v.state().error("bio").is_some());
            assert!(v.state().valid);
        }

        #[test]
        fn test_cross_field_rule_reads_other_values() {
            let mut v = FormValidator::new();
            v.field("password_new", |_, _| None)
                .field("password_confirm", |value, values| {
                    let expected = values
                        .get("password_new")
                        .map(FieldValue::as_text)
                        .unwrap_or("");
                    (value.as_text() != expected).then(|| FieldError::new("Password mismatch"))
                });
            v.validate("password_new", "correct horse");
            v.validate("password_confirm", "correct h0rse");
            assert_eq!(
                v.state().error("password_confirm").map(|e| e.to_string()),
                Some("Password mismatch".to_string())
            );
            v.validate("password_confirm", "correct horse");
            assert!(v.state().valid);
        }
    }

    mod reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_reset_restores_initial_state() {
            let mut v = login_validator();
            v.validate("email", "");
            v.validate("password", "hunter22");
            v.reset();

            assert!(v.state().errors.is_empty());
            assert!(v.state().values.is_empty());
            assert!(v.state().is_pristine("email"));
            assert!(v.state().is_pristine("password"));
            assert!(!v.state().changed);
            assert!(v.state().valid);
            assert_eq!(v.field_names().count(), 2);
        }
    }
}
