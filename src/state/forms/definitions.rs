//! Field sets and validation rules of each portal form

use std::time::Duration;

use chrono::Local;

use super::field::FormField;
use super::form_state::{FormKind, FormModel};
use crate::form::rules::{self, ExpiryError};
use crate::form::{FieldError, FieldOptions, FieldValue, FormValidator, FormValues};
use crate::state::upload::ImageTarget;

const OPTIONAL: FieldOptions = FieldOptions { required: false };

fn err(message: &str) -> Option<FieldError> {
    Some(FieldError::new(message))
}

fn validate_email(value: &FieldValue, _: &FormValues) -> Option<FieldError> {
    let email = value.as_text();
    if email.is_empty() {
        return err("Email is required");
    }
    if !rules::is_email(email) {
        return err("Email is invalid");
    }
    None
}

fn url_rule(
    missing: &'static str,
) -> impl Fn(&FieldValue, &FormValues) -> Option<FieldError> + Send + Sync + 'static {
    move |value, _| {
        let url = value.as_text();
        if url.is_empty() {
            return err(missing);
        }
        if !rules::is_url_with_protocol(url) {
            return err("This is not a valid url (protocol is required)");
        }
        None
    }
}

fn validate_new_password(value: &FieldValue, values: &FormValues) -> Option<FieldError> {
    let new = value.as_text();
    if new.is_empty() {
        return err("New password is required");
    }
    if rules::char_len(new) < 10 {
        return err("New password is too short");
    }
    let current = values.get("password").map(FieldValue::as_text);
    if current == Some(new) {
        return err("Current password and new password are identical");
    }
    // accented letters break the legacy password hashing
    if rules::has_accented_chars(new) {
        return err("New password contain unsupported characters (accented chars such as À-ÖØ-öø-ÿ)");
    }
    None
}

fn validate_password_confirm(value: &FieldValue, values: &FormValues) -> Option<FieldError> {
    let confirm = value.as_text();
    if confirm.is_empty() {
        return err("Password confirmation is required");
    }
    let new = values
        .get("password_new")
        .map(FieldValue::as_text)
        .unwrap_or("");
    if confirm != new {
        return err("Password mismatch");
    }
    None
}

impl FormModel {
    pub fn login(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator.field("email", validate_email).field("password", |v, _| {
            v.as_text()
                .is_empty()
                .then(|| FieldError::new("Password is required"))
        });
        FormModel::new(
            FormKind::Login,
            "Log in",
            "Log in",
            vec![
                FormField::text("email", "E-mail"),
                FormField::secret("password", "Password"),
            ],
            validator,
            loader_delay,
        )
    }

    pub fn signup(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("email", |v, _| {
                let email = v.as_text();
                if email.is_empty() {
                    return err("Email is required");
                }
                if !rules::is_email(email) {
                    return err("Email is not valid");
                }
                None
            })
            .field("login", |v, _| {
                let login = v.as_text();
                if login.is_empty() {
                    return err("Username is required");
                }
                if rules::char_len(login) > 60 {
                    return err("Username name is too long");
                }
                None
            })
            .field("password", |v, _| {
                let password = v.as_text();
                if password.is_empty() {
                    return err("Password is required");
                }
                if !(9..=72).contains(&rules::char_len(password)) {
                    return err("Password should contain between 9 and 72 characters");
                }
                None
            })
            .field("display_name", |v, _| {
                let name = v.as_text();
                if name.is_empty() {
                    return err("Name is required");
                }
                if rules::char_len(name) > 50 {
                    return err("Full name is too long");
                }
                None
            });
        FormModel::new(
            FormKind::Signup,
            "Join",
            "Sign up",
            vec![
                FormField::text("email", "E-mail"),
                FormField::text("login", "Username"),
                FormField::secret("password", "Password"),
                FormField::text("display_name", "Name")
                    .with_placeholder("Your artist name, nickname or label name"),
            ],
            validator,
            loader_delay,
        )
    }

    pub fn password_reset(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator.field("email", validate_email);
        FormModel::new(
            FormKind::PasswordReset,
            "Reset your password",
            "Send reset link",
            vec![FormField::text("email", "E-mail")],
            validator,
            loader_delay,
        )
    }

    /// Second half of the reset: the emailed token and a new password
    pub fn password_reset_update(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("token", |v, _| {
                v.as_text()
                    .trim()
                    .is_empty()
                    .then(|| FieldError::new("Reset token is required"))
            })
            .field("password_new", validate_new_password)
            .field("password_confirm", validate_password_confirm);
        FormModel::new(
            FormKind::PasswordResetUpdate,
            "Choose a new password",
            "Update password",
            vec![
                FormField::text("token", "Reset token")
                    .with_placeholder("Token from the reset email"),
                FormField::secret("password_new", "New password"),
                FormField::secret("password_confirm", "Confirm new password"),
            ],
            validator,
            loader_delay,
        )
    }

    pub fn account_profile(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("email", validate_email)
            .field("displayName", |v, _| {
                v.as_text()
                    .is_empty()
                    .then(|| FieldError::new("Name is required"))
            });
        FormModel::new(
            FormKind::AccountProfile,
            "Account",
            "Update",
            vec![
                FormField::text("email", "E-mail"),
                FormField::text("displayName", "Display name"),
            ],
            validator,
            loader_delay,
        )
        .disabled_until_changed()
    }

    pub fn password_change(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("password", |v, _| {
                let current = v.as_text();
                if current.is_empty() {
                    return err("Current password is required");
                }
                if rules::has_accented_chars(current) {
                    return err(
                        "Current password contain unsupported characters. \
                         You should ask for a password reset.",
                    );
                }
                None
            })
            .field("password_new", validate_new_password)
            .field("password_confirm", validate_password_confirm);
        FormModel::new(
            FormKind::PasswordChange,
            "Change password",
            "Update password",
            vec![
                FormField::secret("password", "Current password"),
                FormField::secret("password_new", "New password"),
                FormField::secret("password_confirm", "Confirm new password"),
            ],
            validator,
            loader_delay,
        )
        .disabled_until_changed()
    }

    pub fn app_register(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("application_name", |v, _| {
                v.as_text()
                    .is_empty()
                    .then(|| FieldError::new("Please enter your app name"))
            })
            .field("redirect_uri", url_rule("Redirect URI is required"))
            .field("application_url", url_rule("App url is required"))
            .field("application_hostname", |v, _| {
                let host = v.as_text();
                if host.is_empty() {
                    return err("A hostname is required");
                }
                if !rules::is_fqdn(host) {
                    return err("This is not valid hostname (fqdn)");
                }
                None
            });
        FormModel::new(
            FormKind::AppRegister,
            "Register a new app",
            "Create app",
            vec![
                FormField::text("application_name", "App name"),
                FormField::text("redirect_uri", "Redirect URI")
                    .with_placeholder("https://app.example.org/callback"),
                FormField::text("application_url", "App url")
                    .with_placeholder("https://app.example.org"),
                FormField::text("application_hostname", "Hostname")
                    .with_placeholder("app.example.org"),
            ],
            validator,
            loader_delay,
        )
    }

    /// Deleting an app requires typing its exact name
    pub fn app_delete(expected_name: &str, loader_delay: Duration) -> Self {
        let expected = expected_name.to_string();
        let mut validator = FormValidator::new();
        validator.field("application_name", move |v, _| {
            let name = v.as_text();
            if name.is_empty() {
                return err("Application name is required");
            }
            if name != expected {
                return err("Application name does not match");
            }
            None
        });
        FormModel::new(
            FormKind::AppDelete,
            "Delete app",
            "Delete",
            vec![FormField::text("application_name", "Type the app name to confirm")],
            validator,
            loader_delay,
        )
        .disabled_until_changed()
    }

    pub fn basic_info(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("name", |v, _| {
                v.as_text()
                    .is_empty()
                    .then(|| FieldError::new("Name is required"))
            })
            .field_with("bio", OPTIONAL, |v, _| {
                (rules::char_len(v.as_text()) > 200)
                    .then(|| FieldError::new("Bio should be no more than 200 characters"))
            })
            .field_with("location", OPTIONAL, |_, _| None)
            .field_with("subscription", OPTIONAL, |v, _| {
                let value = v.as_text();
                (!value.is_empty() && !rules::is_on_off(value))
                    .then(|| FieldError::new("Invalid subscription data"))
            })
            .field("profilePicture", |v, _| {
                let reference = v.as_text();
                if reference.is_empty() {
                    return err("Profile picture is required");
                }
                if !rules::is_uuid_v4(reference) {
                    return err("Profile picture ref is invalid");
                }
                None
            })
            .field_with("headerImage", OPTIONAL, |v, _| {
                let reference = v.as_text();
                (!reference.is_empty() && !rules::is_uuid_v4(reference))
                    .then(|| FieldError::new("Header image ref is invalid"))
            });
        FormModel::new(
            FormKind::BasicInfo,
            "Basic info",
            "Continue",
            vec![
                FormField::text("name", "Name"),
                FormField::multiline("bio", "Bio"),
                FormField::text("location", "Location"),
                FormField::toggle("subscription", "Subscribe to the newsletter"),
                FormField::upload("profilePicture", "Profile picture")
                    .with_placeholder("Press Enter to upload"),
                FormField::upload("headerImage", "Header image")
                    .with_placeholder("Press Enter to upload"),
            ],
            validator,
            loader_delay,
        )
    }

    /// Display name and instrument of one artist member
    pub fn artist_member(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("displayName", |v, _| {
                v.as_text()
                    .trim()
                    .is_empty()
                    .then(|| FieldError::new("Display name is required"))
            })
            .field("role", |v, _| {
                v.as_text()
                    .trim()
                    .is_empty()
                    .then(|| FieldError::new("Role is required"))
            });
        FormModel::new(
            FormKind::ArtistMember,
            "Set member display name and role",
            "Add member",
            vec![
                FormField::text("displayName", "Display name"),
                FormField::text("role", "Role").with_placeholder("E.g.Bass Guitar"),
            ],
            validator,
            loader_delay,
        )
    }

    /// Local file picker whose probed dimensions must fit `target`
    pub fn image_upload(target: ImageTarget, loader_delay: Duration) -> Self {
        let (min_width, min_height) = target.min_dimensions();
        let mut validator = FormValidator::new();
        validator
            .field("path", |v, _| {
                v.as_text()
                    .trim()
                    .is_empty()
                    .then(|| FieldError::new("Image is required"))
            })
            .field("inputFile", move |v, _| match v {
                FieldValue::Dimensions { width, height }
                    if *width < min_width || *height < min_height =>
                {
                    err("Image size is too small")
                }
                // not probed yet
                _ => None,
            });
        FormModel::new(
            FormKind::ImageUpload,
            &format!("Upload {}", target.label().to_lowercase()),
            "Upload",
            vec![FormField::text("path", "Image file (JPEG or PNG)")
                .with_placeholder("~/Pictures/cover.png")],
            validator,
            loader_delay,
        )
    }

    pub fn payment(loader_delay: Duration) -> Self {
        let mut validator = FormValidator::new();
        validator
            .field("name", |v, _| {
                v.as_text()
                    .trim()
                    .is_empty()
                    .then(|| FieldError::new("Card name is required"))
            })
            .field("number", |v, _| {
                let digits = rules::card_digits(v.as_text());
                if digits.is_empty() {
                    return err("Card number is missing");
                }
                if !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return err("Card number is invalid");
                }
                if !(13..=19).contains(&digits.len()) {
                    return err("Card number length should be between 13 and 19 digits");
                }
                if !rules::luhn_valid(&digits) {
                    return err("Card number is invalid");
                }
                None
            })
            .field("expiration", |v, _| {
                let expiration = v.as_text();
                if expiration.trim().is_empty() {
                    return err("Expiration date is required");
                }
                match rules::check_card_expiry(expiration, Local::now().date_naive()) {
                    Ok(()) => None,
                    Err(ExpiryError::Invalid) => err("Invalid date"),
                    Err(ExpiryError::Passed) => err("Card expiration date has passed"),
                }
            })
            .field("cvc", |v, _| {
                let cvc = v.as_text();
                if cvc.is_empty() {
                    return err("CVC is required");
                }
                if cvc.len() != 3 || !cvc.bytes().all(|b| b.is_ascii_digit()) {
                    return err("CVC should be 3 digits");
                }
                None
            });
        FormModel::new(
            FormKind::Payment,
            "Payment method",
            "Save card",
            vec![
                FormField::text("name", "Name on card"),
                FormField::text("number", "Card number"),
                FormField::text("expiration", "Expiration").with_placeholder("MM/YY"),
                FormField::secret("cvc", "CVC"),
            ],
            validator,
            loader_delay,
        )
    }
}
