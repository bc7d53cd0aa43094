use super::state::FieldValue;
use super::validator::FormValidator;

/// Outcome of validating a form before submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitCheck {
    Valid,
    /// `first_invalid` is the first field, in registration order, with a
    /// visible error
    Invalid { first_invalid: Option<String> },
}

impl SubmitCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, SubmitCheck::Valid)
    }
}

/// Validate every required field with its current input and report
/// whether the submission may proceed.
pub fn check_required<F>(validator: &mut FormValidator, current_value: F) -> SubmitCheck
where
    F: Fn(&str) -> FieldValue,
{
    let required: Vec<String> = validator.required_fields().map(str::to_string).collect();
    for name in &required {
        let value = current_value(name);
        validator.validate(name, value);
    }

    if validator.state().valid {
        return SubmitCheck::Valid;
    }

    let first_invalid = validator
        .field_names()
        .find(|name| validator.state().visible_error(name).is_some())
        .map(str::to_string);
    SubmitCheck::Invalid { first_invalid }
}
