//! Form model shared by every screen

use std::time::{Duration, Instant};

use super::field::{FieldKind, FormField};
use crate::form::{
    check_required, FieldError, FieldValue, FormEvent, FormValidator, RenderSignal,
    SubmissionMachines, SubmitCheck,
};
use crate::state::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Login,
    Signup,
    PasswordReset,
    PasswordResetUpdate,
    AccountProfile,
    PasswordChange,
    AppRegister,
    AppDelete,
    BasicInfo,
    ArtistMember,
    ImageUpload,
    Payment,
}

/// Inline message under a form's submit button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: NotificationKind,
    pub text: String,
}

/// What happened when the user asked to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Validation failed; focus moved to the first field in error
    Invalid,
    /// A request from this form is still in flight
    Busy,
    /// The request may be spawned
    Started,
}

/// Inputs, validator and lifecycle machines of one mounted form.
///
/// The field list is the focus order; the submit button sits after the
/// last field.
#[derive(Debug)]
pub struct FormModel {
    pub kind: FormKind,
    pub title: String,
    pub button_text: String,
    pub fields: Vec<FormField>,
    pub active_field_index: usize,
    pub validator: FormValidator,
    pub machines: SubmissionMachines,
    pub status: Option<StatusLine>,
    disable_until_changed: bool,
}

impl FormModel {
    pub fn new(
        kind: FormKind,
        title: &str,
        button_text: &str,
        fields: Vec<FormField>,
        validator: FormValidator,
        loader_delay: Duration,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            button_text: button_text.to_string(),
            fields,
            active_field_index: 0,
            validator,
            machines: SubmissionMachines::new(loader_delay),
            status: None,
            disable_until_changed: false,
        }
    }

    /// Keep the submit button disabled until something was edited
    pub fn disabled_until_changed(mut self) -> Self {
        self.disable_until_changed = true;
        self
    }

    /// Raise `signal` whenever one of this form's machines transitions
    pub fn with_signal(mut self, signal: &RenderSignal) -> Self {
        self.machines.attach_signal(signal.clone());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Current buffer of `name`, empty when unknown
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map(FormField::as_text).unwrap_or("")
    }

    pub fn is_button_active(&self) -> bool {
        self.active_field_index == self.fields.len()
    }

    pub fn active_field_name(&self) -> Option<&str> {
        self.fields
            .get(self.active_field_index)
            .map(|f| f.name.as_str())
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.validator.state().is_required(name)
    }

    pub fn visible_error(&self, name: &str) -> Option<&FieldError> {
        self.validator.state().visible_error(name)
    }

    pub fn is_valid(&self) -> bool {
        self.validator.state().valid
    }

    pub fn is_loading(&self) -> bool {
        self.machines.is_loading()
    }

    /// Validate the focused field with what was typed into it
    pub fn blur(&mut self) {
        let Some(field) = self.fields.get(self.active_field_index) else {
            return;
        };
        if field.kind == FieldKind::Upload {
            return;
        }
        let (name, value) = (field.name.clone(), field.value.clone());
        self.validator.validate(&name, value);
    }

    /// Focus stops: every field, then the submit button
    fn focus_stops(&self) -> usize {
        self.fields.len() + 1
    }

    pub fn focus_next(&mut self) {
        self.blur();
        self.active_field_index = (self.active_field_index + 1) % self.focus_stops();
    }

    pub fn focus_prev(&mut self) {
        self.blur();
        let stops = self.focus_stops();
        self.active_field_index = (self.active_field_index + stops - 1) % stops;
    }

    fn active_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.active_field_index)
    }

    pub fn focus(&mut self, name: &str) {
        if let Some(index) = self.fields.iter().position(|f| f.name == name) {
            self.active_field_index = index;
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(field) = self.active_field_mut() {
            field.push_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.active_field_mut() {
            field.pop_char();
        }
    }

    pub fn toggle_active(&mut self) {
        if let Some(field) = self.active_field_mut() {
            field.toggle_value();
        }
    }

    /// Replace a field's buffer and validate it immediately
    pub fn set_value(&mut self, name: &str, value: &str) {
        if let Some(field) = self.field_mut(name) {
            field.set_text(value);
        }
        self.validator.validate(name, value);
    }

    /// Run the submission protocol: validate every required field, then
    /// gate the request on the outcome.
    pub fn submit(&mut self, now: Instant) -> Submission {
        self.machines.form.emit(FormEvent::Submit);
        let fields = &self.fields;
        let check = check_required(&mut self.validator, |name| {
            let buffer = fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.value.as_str())
                .unwrap_or("");
            FieldValue::from(buffer)
        });

        match check {
            SubmitCheck::Valid => {
                self.machines.form.emit(FormEvent::Valid);
                if !self.machines.start_request(now) {
                    tracing::debug!("{:?} submit ignored, request in flight", self.kind);
                    return Submission::Busy;
                }
                self.status = None;
                Submission::Started
            }
            SubmitCheck::Invalid { first_invalid } => {
                self.machines.form.emit(FormEvent::Invalid);
                if let Some(name) = first_invalid {
                    self.focus(&name);
                }
                Submission::Invalid
            }
        }
    }

    /// The spawned request succeeded
    pub fn succeed(&mut self) {
        self.machines.resolve();
    }

    /// The spawned request failed; keep the input for a retry
    pub fn fail(&mut self, message: impl Into<String>) {
        self.machines.reject();
        self.status = Some(StatusLine {
            kind: NotificationKind::Error,
            text: message.into(),
        });
    }

    /// A settings form was saved: keep the inputs, start over as if
    /// freshly loaded
    pub fn mark_saved(&mut self) {
        self.machines.resolve();
        self.machines.form.emit(FormEvent::Reset);
        self.validator.reset();
    }

    pub fn set_status(&mut self, kind: NotificationKind, text: impl Into<String>) {
        self.status = Some(StatusLine {
            kind,
            text: text.into(),
        });
    }

    /// Clear inputs and validation after a successful submission
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.validator.reset();
        self.machines.reset();
        self.active_field_index = 0;
    }

    pub fn button_disabled(&self) -> bool {
        if self.is_loading() {
            return true;
        }
        self.disable_until_changed
            && self
                .machines
                .button_disabled(self.is_valid(), self.validator.state().changed)
    }

    /// Advance the loader; returns true when it changed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.machines.tick(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormValues;
    use pretty_assertions::assert_eq;

    fn required(
        message: &'static str,
    ) -> impl Fn(&FieldValue, &FormValues) -> Option<FieldError> + Send + Sync + 'static {
        move |v, _| v.as_text().is_empty().then(|| FieldError::new(message))
    }

    fn sample() -> FormModel {
        let mut validator = FormValidator::new();
        validator
            .field("email", required("Email is required"))
            .field("password", required("Password is required"));
        FormModel::new(
            FormKind::Login,
            "Log in",
            "Log in",
            vec![
                FormField::text("email", "Email"),
                FormField::secret("password", "Password"),
            ],
            validator,
            Duration::from_millis(300),
        )
    }

    fn type_into(form: &mut FormModel, text: &str) {
        for c in text.chars() {
            form.input_char(c);
        }
    }

    mod navigation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_focus_next_wraps_through_button() {
            let mut form = sample();
            form.focus_next();
            form.focus_next();
            assert!(form.is_button_active());
            form.focus_next();
            assert_eq!(form.active_field_index, 0);
        }

        #[test]
        fn test_focus_prev_wraps_to_button() {
            let mut form = sample();
            form.focus_prev();
            assert!(form.is_button_active());
        }

        #[test]
        fn test_focus_next_validates_on_blur() {
            let mut form = sample();
            form.focus_next();
            assert_eq!(
                form.visible_error("email").map(|e| e.message.as_str()),
                Some("Email is required")
            );
            assert!(form.visible_error("password").is_none());
            assert_eq!(form.active_field_name(), Some("password"));
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_invalid_submit_focuses_first_error() {
            let mut form = sample();
            form.focus("password");
            type_into(&mut form, "hunter22");
            form.active_field_index = form.fields.len();

            assert_eq!(form.submit(Instant::now()), Submission::Invalid);
            assert_eq!(form.active_field_name(), Some("email"));
            assert!(!form.is_loading());
        }

        #[test]
        fn test_valid_submit_starts_once() {
            let mut form = sample();
            type_into(&mut form, "ada@example.org");
            form.focus("password");
            type_into(&mut form, "hunter22");

            let now = Instant::now();
            assert_eq!(form.submit(now), Submission::Started);
            assert!(form.is_loading());
            assert!(form.button_disabled());
            assert_eq!(form.submit(now), Submission::Busy);
        }

        #[test]
        fn test_failure_keeps_input_and_sets_status() {
            let mut form = sample();
            type_into(&mut form, "ada@example.org");
            form.focus("password");
            type_into(&mut form, "hunter22");
            form.submit(Instant::now());
            form.fail("Wrong email or password");

            assert_eq!(form.value("email"), "ada@example.org");
            assert_eq!(
                form.status.as_ref().map(|s| s.text.as_str()),
                Some("Wrong email or password")
            );
            assert!(!form.is_loading());
            assert_eq!(form.submit(Instant::now()), Submission::Started);
        }

        #[test]
        fn test_reset_clears_everything() {
            let mut form = sample();
            type_into(&mut form, "ada@example.org");
            form.submit(Instant::now());
            form.reset();
            assert_eq!(form.value("email"), "");
            assert!(form.validator.state().errors.is_empty());
            assert_eq!(form.active_field_index, 0);
        }
    }

    #[test]
    fn test_mark_saved_disables_again() {
        let mut form = sample().disabled_until_changed();
        form.set_value("email", "ada@example.org");
        form.set_value("password", "hunter22");
        assert_eq!(form.submit(Instant::now()), Submission::Started);
        form.mark_saved();
        assert!(form.button_disabled());
        assert_eq!(form.value("email"), "ada@example.org");
        assert!(!form.is_loading());
    }

    #[test]
    fn test_disabled_until_changed() {
        let mut form = sample().disabled_until_changed();
        assert!(form.button_disabled());
        form.set_value("email", "ada@example.org");
        assert!(!form.button_disabled());
    }
}
