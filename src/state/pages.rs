//! Per-screen state that goes beyond a single form

use std::time::Duration;

use super::countries::{self, COUNTRIES};
use super::upload::{ImageTarget, ProbedImage};
use super::{query_value, FormModel, Profile, Redirect, RegisteredApp, Usergroup};
use crate::form::{Machine, RenderSignal, SubmissionMachines};

fn machines(loader_delay: Duration, signal: &RenderSignal) -> SubmissionMachines {
    let mut machines = SubmissionMachines::new(loader_delay);
    machines.attach_signal(signal.clone());
    machines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetStage {
    /// Ask for the reset e-mail
    #[default]
    Request,
    /// Enter the e-mailed token and a new password
    Update,
}

/// Password reset: request the e-mail, then complete with its token
#[derive(Debug)]
pub struct PasswordResetPage {
    pub stage: ResetStage,
    pub request: FormModel,
    pub update: FormModel,
}

impl PasswordResetPage {
    pub fn new(loader_delay: Duration, signal: &RenderSignal) -> Self {
        Self {
            stage: ResetStage::default(),
            request: FormModel::password_reset(loader_delay).with_signal(signal),
            update: FormModel::password_reset_update(loader_delay).with_signal(signal),
        }
    }

    pub fn toggle_stage(&mut self) {
        self.stage = match self.stage {
            ResetStage::Request => ResetStage::Update,
            ResetStage::Update => ResetStage::Request,
        };
    }

    pub fn focused_form(&self) -> &FormModel {
        match self.stage {
            ResetStage::Request => &self.request,
            ResetStage::Update => &self.update,
        }
    }

    pub fn focused_form_mut(&mut self) -> &mut FormModel {
        match self.stage {
            ResetStage::Request => &mut self.request,
            ResetStage::Update => &mut self.update,
        }
    }
}

/// OAuth consent screen
#[derive(Debug)]
pub struct AuthorizePage {
    /// Pending OAuth request, as found on the login redirect
    pub query: String,
    pub client_id: String,
    pub application_name: String,
    /// Highlighted choice: Allow when true, Deny otherwise
    pub allow: bool,
    pub request: SubmissionMachines,
    pub redirect: Option<Redirect>,
}

impl AuthorizePage {
    pub fn new(loader_delay: Duration, signal: &RenderSignal) -> Self {
        Self {
            query: String::new(),
            client_id: String::new(),
            application_name: String::new(),
            allow: true,
            request: machines(loader_delay, signal),
            redirect: None,
        }
    }

    /// Adopt the pending OAuth request; the client id is read from it
    pub fn load_query(&mut self, query: &str) {
        self.query = query.trim_start_matches('?').to_string();
        self.client_id = query_value(&format!("?{}", self.query), "client_id").unwrap_or_default();
    }

    pub fn toggle_choice(&mut self) {
        self.allow = !self.allow;
    }

    /// Name shown to the user, falling back to the raw client id
    pub fn display_name(&self) -> &str {
        if self.application_name.is_empty() {
            &self.client_id
        } else {
            &self.application_name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountSection {
    #[default]
    Profile,
    Usergroups,
    Location,
    Password,
    Delete,
}

impl AccountSection {
    pub const ALL: [AccountSection; 5] = [
        AccountSection::Profile,
        AccountSection::Usergroups,
        AccountSection::Location,
        AccountSection::Password,
        AccountSection::Delete,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AccountSection::Profile => "Account",
            AccountSection::Usergroups => "Profiles",
            AccountSection::Location => "Location",
            AccountSection::Password => "Change password",
            AccountSection::Delete => "Delete account",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Account settings: profile, owned profiles, location, password and
/// deletion sections
#[derive(Debug)]
pub struct AccountPage {
    pub section: AccountSection,
    pub profile_form: FormModel,
    pub password_form: FormModel,
    /// Owned usergroups, as last fetched
    pub usergroups: Vec<Usergroup>,
    pub usergroup_cursor: usize,
    /// Highlighted entry of the country list
    pub country_cursor: usize,
    /// Entry currently stored on the profile
    pub saved_country: Option<usize>,
    pub location: SubmissionMachines,
    pub deletion: SubmissionMachines,
}

impl AccountPage {
    pub fn new(loader_delay: Duration, signal: &RenderSignal) -> Self {
        Self {
            section: AccountSection::default(),
            profile_form: FormModel::account_profile(loader_delay).with_signal(signal),
            password_form: FormModel::password_change(loader_delay).with_signal(signal),
            usergroups: Vec::new(),
            usergroup_cursor: 0,
            country_cursor: 0,
            saved_country: None,
            location: machines(loader_delay, signal),
            deletion: machines(loader_delay, signal),
        }
    }

    /// Fill the sections from the fetched profile without marking
    /// anything as changed
    pub fn load_profile(&mut self, profile: &Profile) {
        if let Some(field) = self.profile_form.field_mut("email") {
            field.set_text(profile.email.as_str());
        }
        if let Some(field) = self.profile_form.field_mut("displayName") {
            field.set_text(profile.display_name.as_str());
        }
        self.saved_country = profile.country.as_deref().and_then(countries::position_of);
        self.country_cursor = self.saved_country.unwrap_or(0);
        self.usergroups = profile.usergroups.clone();
        self.usergroup_cursor = self
            .usergroup_cursor
            .min(self.usergroups.len().saturating_sub(1));
    }

    /// Point the usergroup cursor at `id` when it is owned
    pub fn highlight_usergroup(&mut self, id: &str) {
        if let Some(index) = self.usergroups.iter().position(|g| g.id == id) {
            self.usergroup_cursor = index;
        }
    }

    pub fn move_usergroup(&mut self, delta: isize) {
        let len = self.usergroups.len() as isize;
        if len > 0 {
            self.usergroup_cursor =
                (self.usergroup_cursor as isize + delta).rem_euclid(len) as usize;
        }
    }

    pub fn highlighted_usergroup(&self) -> Option<&Usergroup> {
        self.usergroups.get(self.usergroup_cursor)
    }

    pub fn focused_form(&self) -> Option<&FormModel> {
        match self.section {
            AccountSection::Profile => Some(&self.profile_form),
            AccountSection::Password => Some(&self.password_form),
            AccountSection::Usergroups | AccountSection::Location | AccountSection::Delete => {
                None
            }
        }
    }

    pub fn next_section(&mut self) {
        self.section = self.section.next();
    }

    pub fn prev_section(&mut self) {
        self.section = self.section.prev();
    }

    pub fn move_country(&mut self, delta: isize) {
        let len = COUNTRIES.len() as isize;
        self.country_cursor = (self.country_cursor as isize + delta).rem_euclid(len) as usize;
    }

    /// Move to the next country whose name starts with `letter`
    pub fn jump_to_letter(&mut self, letter: char) {
        let letter = letter.to_ascii_lowercase();
        let len = COUNTRIES.len();
        let found = (1..=len)
            .map(|offset| (self.country_cursor + offset) % len)
            .find(|&i| {
                COUNTRIES[i]
                    .1
                    .chars()
                    .next()
                    .is_some_and(|c| c.to_ascii_lowercase() == letter)
            });
        if let Some(index) = found {
            self.country_cursor = index;
        }
    }

    /// `(code, name)` under the cursor
    pub fn highlighted_country(&self) -> (&'static str, &'static str) {
        COUNTRIES[self.country_cursor.min(COUNTRIES.len() - 1)]
    }

    pub fn country_changed(&self) -> bool {
        self.saved_country != Some(self.country_cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppsFocus {
    #[default]
    List,
    Register,
}

/// Registered OAuth apps with the register and delete forms
#[derive(Debug)]
pub struct AppsPage {
    pub apps: Vec<RegisteredApp>,
    pub selected: usize,
    pub focus: AppsFocus,
    pub list: SubmissionMachines,
    pub register_form: FormModel,
    pub delete_form: Option<FormModel>,
    pub delete_target: Option<RegisteredApp>,
    loader_delay: Duration,
    signal: RenderSignal,
}

impl AppsPage {
    pub fn new(loader_delay: Duration, signal: &RenderSignal) -> Self {
        Self {
            apps: Vec::new(),
            selected: 0,
            focus: AppsFocus::default(),
            list: machines(loader_delay, signal),
            register_form: FormModel::app_register(loader_delay).with_signal(signal),
            delete_form: None,
            delete_target: None,
            loader_delay,
            signal: signal.clone(),
        }
    }

    pub fn set_apps(&mut self, apps: Vec<RegisteredApp>) {
        self.apps = apps;
        self.selected = self.selected.min(self.apps.len().saturating_sub(1));
    }

    pub fn selected_app(&self) -> Option<&RegisteredApp> {
        self.apps.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.apps.is_empty() {
            self.selected = (self.selected + 1) % self.apps.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.apps.is_empty() {
            self.selected = (self.selected + self.apps.len() - 1) % self.apps.len();
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AppsFocus::List => AppsFocus::Register,
            AppsFocus::Register => AppsFocus::List,
        };
    }

    pub fn focused_form(&self) -> Option<&FormModel> {
        (self.focus == AppsFocus::Register).then_some(&self.register_form)
    }

    /// Mount the delete form for the selected app. Returns false when
    /// nothing is selected.
    pub fn open_delete(&mut self) -> bool {
        let Some(app) = self.selected_app().cloned() else {
            return false;
        };
        self.delete_form = Some(
            FormModel::app_delete(&app.application_name, self.loader_delay)
                .with_signal(&self.signal),
        );
        self.delete_target = Some(app);
        true
    }

    pub fn close_delete(&mut self) {
        self.delete_form = None;
        self.delete_target = None;
    }

    pub fn remove_app(&mut self, client_id: &str) {
        self.apps.retain(|app| app.client_id != client_id);
        self.selected = self.selected.min(self.apps.len().saturating_sub(1));
    }

    /// Add a freshly registered app to the list without its secret
    pub fn push_app(&mut self, app: &RegisteredApp) {
        self.apps.push(RegisteredApp {
            secret: None,
            ..app.clone()
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileStep {
    ProfileType,
    BasicInfo,
    Recap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepEvent {
    Next,
    Prev,
}

pub fn profile_steps() -> Machine<ProfileStep, StepEvent> {
    Machine::with_transitions(
        ProfileStep::ProfileType,
        &[
            (ProfileStep::ProfileType, StepEvent::Next, ProfileStep::BasicInfo),
            (ProfileStep::BasicInfo, StepEvent::Next, ProfileStep::Recap),
            (ProfileStep::BasicInfo, StepEvent::Prev, ProfileStep::ProfileType),
            (ProfileStep::Recap, StepEvent::Prev, ProfileStep::BasicInfo),
        ],
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileType {
    #[default]
    Listener,
    Artist,
    Label,
}

impl ProfileType {
    pub const ALL: [ProfileType; 3] = [ProfileType::Listener, ProfileType::Artist, ProfileType::Label];

    pub fn label(&self) -> &'static str {
        match self {
            ProfileType::Listener => "Listener",
            ProfileType::Artist => "Artist",
            ProfileType::Label => "Label",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProfileType::Listener => "Stream and support the music you love",
            ProfileType::Artist => "Release your music as an artist member",
            ProfileType::Label => "Manage several artists under one label",
        }
    }

    /// Role sent to the backend
    pub fn role(&self) -> &'static str {
        match self {
            ProfileType::Listener => "fans",
            ProfileType::Artist => "member",
            ProfileType::Label => "label-owner",
        }
    }

    /// Label onboarding is closed for now
    pub fn is_paused(&self) -> bool {
        matches!(self, ProfileType::Label)
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

/// File picker mounted over the basic-info step
#[derive(Debug)]
pub struct UploadDialog {
    pub target: ImageTarget,
    pub form: FormModel,
    pub probed: Option<ProbedImage>,
}

/// Band member listed on an artist profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistMember {
    pub display_name: String,
    pub role: String,
}

/// New profile onboarding: profile type, basic info, recap
#[derive(Debug)]
pub struct ProfileNewPage {
    pub steps: Machine<ProfileStep, StepEvent>,
    pub profile_type: ProfileType,
    pub type_request: SubmissionMachines,
    pub basic_info: FormModel,
    pub upload: Option<UploadDialog>,
    pub members: Vec<ArtistMember>,
    pub member_form: Option<FormModel>,
    loader_delay: Duration,
    signal: RenderSignal,
}

impl ProfileNewPage {
    pub fn new(loader_delay: Duration, signal: &RenderSignal) -> Self {
        Self {
            steps: profile_steps().with_signal(signal.clone()),
            profile_type: ProfileType::default(),
            type_request: machines(loader_delay, signal),
            basic_info: FormModel::basic_info(loader_delay).with_signal(signal),
            upload: None,
            members: Vec::new(),
            member_form: None,
            loader_delay,
            signal: signal.clone(),
        }
    }

    pub fn step(&self) -> ProfileStep {
        self.steps.state()
    }

    pub fn next_type(&mut self) {
        let all = ProfileType::ALL;
        self.profile_type = all[(self.profile_type.index() + 1) % all.len()];
    }

    pub fn prev_type(&mut self) {
        let all = ProfileType::ALL;
        self.profile_type = all[(self.profile_type.index() + all.len() - 1) % all.len()];
    }

    pub fn focused_form(&self) -> Option<&FormModel> {
        (self.step() == ProfileStep::BasicInfo).then_some(&self.basic_info)
    }

    pub fn open_upload(&mut self, target: ImageTarget) {
        self.upload = Some(UploadDialog {
            target,
            form: FormModel::image_upload(target, self.loader_delay).with_signal(&self.signal),
            probed: None,
        });
    }

    pub fn close_upload(&mut self) {
        self.upload = None;
    }

    /// Validate the uploaded filename into its basic-info field and close
    /// the picker
    pub fn apply_upload(&mut self, target: ImageTarget, filename: &str) {
        self.basic_info.set_value(target.field_name(), filename);
        self.close_upload();
    }

    /// Only artist profiles list members
    pub fn open_member(&mut self) -> bool {
        if self.profile_type != ProfileType::Artist {
            return false;
        }
        self.member_form =
            Some(FormModel::artist_member(self.loader_delay).with_signal(&self.signal));
        true
    }

    pub fn close_member(&mut self) {
        self.member_form = None;
    }

    /// Keep the member from the submitted form and close it
    pub fn add_member(&mut self) -> Option<&ArtistMember> {
        let form = self.member_form.take()?;
        self.members.push(ArtistMember {
            display_name: form.value("displayName").trim().to_string(),
            role: form.value("role").trim().to_string(),
        });
        self.members.last()
    }
}
