//! Application state definitions

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::pages::{
    AccountPage, AppsPage, AuthorizePage, PasswordResetPage, ProfileNewPage,
};
use super::FormModel;
use crate::form::RenderSignal;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Login,
    Signup,
    PasswordReset,
    Authorize,
    Account,
    Apps,
    ProfileNew,
    Membership,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Log in",
            View::Signup => "Join",
            View::PasswordReset => "Password reset",
            View::Authorize => "Authorize",
            View::Account => "Account settings",
            View::Apps => "Apps",
            View::ProfileNew => "New profile",
            View::Membership => "Membership",
        }
    }

    /// Views only reachable with a session
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            View::Account | View::Apps | View::ProfileNew | View::Membership | View::Authorize
        )
    }

    /// Views reachable with F1..F4, depending on the session
    pub fn menu(signed_in: bool) -> &'static [View] {
        if signed_in {
            &[View::Account, View::Apps, View::ProfileNew, View::Membership]
        } else {
            &[View::Login, View::Signup, View::PasswordReset]
        }
    }
}

/// View parameters for navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    /// Raw query of the pending OAuth request (`client_id`, `state`,
    /// `redirect_uri`, `scope`...), posted back untouched
    pub authorize_query: Option<String>,
    pub application_name: Option<String>,
}

/// Origin used to resolve relative redirect targets
const RELATIVE_ORIGIN: &str = "http://localhost/";

fn parse_location(location: &str) -> Option<Url> {
    Url::parse(location)
        .or_else(|_| Url::parse(RELATIVE_ORIGIN).and_then(|base| base.join(location)))
        .ok()
}

/// Percent-decoded value of `key` in the query of `location`, which may be
/// an absolute URL, a path or a bare `?query`
pub fn query_value(location: &str, key: &str) -> Option<String> {
    parse_location(location)?
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Signed-in account as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: u64,
    pub email: String,
    #[serde(default, alias = "nickname")]
    pub display_name: String,
    #[serde(default)]
    pub email_confirmed: bool,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Artist and label profiles owned by the account
    #[serde(default)]
    pub usergroups: Vec<Usergroup>,
}

/// Artist or label profile owned by an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usergroup {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
}

/// `{message, status}` acknowledgement body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

/// Target of a 3xx answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    /// Decoded value of a query parameter on the redirect target
    pub fn query_param(&self, key: &str) -> Option<String> {
        query_value(&self.location, key)
    }

    /// Query string of the target, still encoded
    pub fn query(&self) -> Option<String> {
        parse_location(&self.location)?
            .query()
            .filter(|q| !q.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    Redirected(Redirect),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub email: String,
    pub login: String,
    pub password: String,
    pub display_name: String,
}

/// Consent answer; `query` is the pending OAuth request as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub query: String,
    pub allow: bool,
}

/// Partial profile update; `None` and empty fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub role: Option<String>,
    pub country: Option<String>,
}

impl ProfileUpdate {
    pub fn role(role: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            ..Self::default()
        }
    }

    /// The backend stores the country name, not its code
    pub fn country(name: &str) -> Self {
        Self {
            country: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Form pairs for the non-empty fields
    pub fn form_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("email", &self.email),
            ("nickname", &self.nickname),
            ("role", &self.role),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.clone()))
        })
        .collect()
    }
}

/// Onboarding basic info stored on the profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicInfo {
    pub nickname: String,
    pub city: String,
    pub bio: String,
}

/// Reset completion with the token from the reset e-mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetUpdate {
    pub token: String,
    pub password_new: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub password: String,
    pub password_new: String,
    pub password_confirm: String,
}

/// OAuth client registered by the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredApp {
    #[serde(alias = "key")]
    pub client_id: String,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub application_name: String,
    #[serde(default)]
    pub application_hostname: String,
    #[serde(default, alias = "applicationURL")]
    pub application_url: String,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRegistration {
    pub application_name: String,
    pub redirect_uri: String,
    pub application_url: String,
    pub application_hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDeletion {
    pub client_id: String,
    pub application_name: String,
}

/// File contents ready for the multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub name: String,
    pub number: String,
    pub expiration: String,
    pub cvc: String,
}

/// Modal overlay shown above the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// Confirm account deletion; `confirm` is the highlighted option
    DeleteAccount { confirm: bool },
    /// Offered after a password change
    LogoutPrompt { confirm: bool },
    /// Client secret, shown once after registration
    AppSecret(RegisteredApp),
    /// Type the application name to delete it
    DeleteApp,
    /// Pick a local image for the basic-info step
    ImageUpload,
    /// Name and role of a new artist member
    ArtistMember,
}

/// Main application state
#[derive(Debug)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_params: ViewParams,
    pub view_history: Vec<(View, ViewParams)>,

    // Session
    pub profile: Option<Profile>,
    /// Usergroup the account currently acts as
    pub active_usergroup: Option<String>,

    // Screens
    pub login: FormModel,
    pub signup: FormModel,
    pub password_reset: PasswordResetPage,
    pub authorize: AuthorizePage,
    pub account: AccountPage,
    pub apps: AppsPage,
    pub profile_new: ProfileNewPage,
    pub membership: FormModel,

    // Overlays
    pub dialog: Option<Dialog>,
    pub errors: Vec<String>,

    /// Raised by every machine transition
    pub render: RenderSignal,
    loader_delay: Duration,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl AppState {
    /// Fresh state with every screen's form mounted
    pub fn new(loader_delay: Duration) -> Self {
        let render = RenderSignal::new();
        Self {
            current_view: View::default(),
            view_params: ViewParams::default(),
            view_history: Vec::new(),
            profile: None,
            active_usergroup: None,
            login: FormModel::login(loader_delay).with_signal(&render),
            signup: FormModel::signup(loader_delay).with_signal(&render),
            password_reset: PasswordResetPage::new(loader_delay, &render),
            authorize: AuthorizePage::new(loader_delay, &render),
            account: AccountPage::new(loader_delay, &render),
            apps: AppsPage::new(loader_delay, &render),
            profile_new: ProfileNewPage::new(loader_delay, &render),
            membership: FormModel::payment(loader_delay).with_signal(&render),
            dialog: None,
            errors: Vec::new(),
            render,
            loader_delay,
        }
    }

    /// Replace the state of `view` with a freshly mounted one
    pub fn remount(&mut self, view: View) {
        let (delay, render) = (self.loader_delay, &self.render);
        match view {
            View::Login => self.login = FormModel::login(delay).with_signal(render),
            View::Signup => self.signup = FormModel::signup(delay).with_signal(render),
            View::PasswordReset => self.password_reset = PasswordResetPage::new(delay, render),
            View::Authorize => self.authorize = AuthorizePage::new(delay, render),
            View::Account => self.account = AccountPage::new(delay, render),
            View::Apps => self.apps = AppsPage::new(delay, render),
            View::ProfileNew => self.profile_new = ProfileNewPage::new(delay, render),
            View::Membership => self.membership = FormModel::payment(delay).with_signal(render),
        }
        render.request();
    }

    /// Advance every loader; returns true when one changed
    pub fn tick(&mut self, now: std::time::Instant) -> bool {
        let mut changed = false;
        for form in [
            &mut self.login,
            &mut self.signup,
            &mut self.password_reset.request,
            &mut self.password_reset.update,
            &mut self.account.profile_form,
            &mut self.account.password_form,
            &mut self.apps.register_form,
            &mut self.profile_new.basic_info,
            &mut self.membership,
        ] {
            changed |= form.tick(now);
        }
        for machines in [
            &mut self.authorize.request,
            &mut self.account.location,
            &mut self.account.deletion,
            &mut self.apps.list,
            &mut self.profile_new.type_request,
        ] {
            changed |= machines.tick(now);
        }
        if let Some(form) = self.apps.delete_form.as_mut() {
            changed |= form.tick(now);
        }
        if let Some(upload) = self.profile_new.upload.as_mut() {
            changed |= upload.form.tick(now);
        }
        changed
    }

    pub fn is_signed_in(&self) -> bool {
        self.profile.is_some()
    }

    /// Usergroup the account acts as, if it owns any
    pub fn active_usergroup(&self) -> Option<&Usergroup> {
        let groups = &self.profile.as_ref()?.usergroups;
        let id = self.active_usergroup.as_deref()?;
        groups.iter().find(|g| g.id == id)
    }

    /// Name shown for the session: the active usergroup, else the account
    pub fn persona_name(&self) -> Option<&str> {
        let profile = self.profile.as_ref()?;
        let name = self
            .active_usergroup()
            .map(|g| g.display_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(profile.display_name.as_str());
        Some(name).filter(|n| !n.is_empty())
    }

    pub fn push_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        if !self.errors.is_empty() {
            self.errors.remove(0);
        }
    }

    /// Form the user is typing into on the current view, if any
    pub fn active_form(&self) -> Option<&FormModel> {
        match self.dialog {
            Some(Dialog::DeleteApp) => return self.apps.delete_form.as_ref(),
            Some(Dialog::ImageUpload) => return self.profile_new.upload.as_ref().map(|u| &u.form),
            Some(Dialog::ArtistMember) => return self.profile_new.member_form.as_ref(),
            Some(_) => return None,
            None => {}
        }
        match self.current_view {
            View::Login => Some(&self.login),
            View::Signup => Some(&self.signup),
            View::PasswordReset => Some(self.password_reset.focused_form()),
            View::Authorize => None,
            View::Account => self.account.focused_form(),
            View::Apps => self.apps.focused_form(),
            View::ProfileNew => self.profile_new.focused_form(),
            View::Membership => Some(&self.membership),
        }
    }
}
