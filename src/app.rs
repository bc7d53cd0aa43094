//! Application state and core logic

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{AccountApi, ApiClient, ApiError};
use crate::config::PortalConfig;
use crate::platform::SHORTCUT_MODIFIER;
use crate::state::{
    upload, AccountSection, ApiMessage, AppDeletion, AppRegistration, AppState, AppsFocus,
    AuthorizeRequest, BasicInfo, ComponentId, Dialog, FieldKind, FormModel, ImageTarget,
    JoinRequest, LoginOutcome, LoginRequest, NotificationKind, Notifier, PasswordChange,
    PasswordResetUpdate, PaymentMethod, ProbedImage, Profile, ProfileStep, ProfileUpdate,
    ResetStage, StepEvent, Submission, TaskOutcome, TaskResult, TaskRunner, View, ViewParams,
};

pub const DELETION_NOTICE: &str = "Your account has been scheduled for deletion in 24 hours. \
     You will receive one last email to confirm or cancel the deletion.";
const DELETION_NOTICE_TIMEOUT: Duration = Duration::from_secs(10);

/// What a key press asked of the form it was sent to
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormAction {
    None,
    Submit,
    Cancel,
    /// Enter on an upload field; carries the field name
    Upload(String),
}

/// Shared key handling for every form: typing, focus moves (which
/// validate the field being left), toggles and submit
fn handle_form_key(form: &mut FormModel, key: KeyEvent) -> FormAction {
    let kind = form.fields.get(form.active_field_index).map(|f| f.kind);
    let name = form.active_field_name().map(str::to_string);

    match key.code {
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.blur();
            FormAction::Submit
        }
        KeyCode::Tab | KeyCode::Down => {
            form.focus_next();
            FormAction::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.focus_prev();
            FormAction::None
        }
        KeyCode::Esc => FormAction::Cancel,
        KeyCode::Enter if form.is_button_active() => FormAction::Submit,
        KeyCode::Enter => match kind {
            Some(FieldKind::Multiline) => {
                form.input_char('\n');
                FormAction::None
            }
            Some(FieldKind::Toggle) => {
                form.toggle_active();
                FormAction::None
            }
            Some(FieldKind::Upload) => name.map_or(FormAction::None, FormAction::Upload),
            _ => {
                form.focus_next();
                FormAction::None
            }
        },
        KeyCode::Char(' ') if kind == Some(FieldKind::Toggle) => {
            form.toggle_active();
            FormAction::None
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.input_char(c);
            FormAction::None
        }
        KeyCode::Backspace => {
            form.backspace();
            FormAction::None
        }
        _ => FormAction::None,
    }
}

/// Run the submission protocol unless the button is disabled. Returns true
/// when the request may be spawned.
fn begin_submit(form: &mut FormModel) -> bool {
    if form.button_disabled() {
        tracing::debug!("{:?} submit ignored, button disabled", form.kind);
        return false;
    }
    form.submit(Instant::now()) == Submission::Started
}

/// Components living on each view
fn components(view: View) -> &'static [ComponentId] {
    match view {
        View::Login => &[ComponentId::Login],
        View::Signup => &[ComponentId::Signup],
        View::PasswordReset => &[ComponentId::PasswordReset, ComponentId::PasswordResetUpdate],
        View::Authorize => &[ComponentId::Authorize],
        View::Account => &[
            ComponentId::AccountProfile,
            ComponentId::AccountLocation,
            ComponentId::AccountPassword,
            ComponentId::AccountDelete,
        ],
        View::Apps => &[
            ComponentId::AppList,
            ComponentId::AppRegister,
            ComponentId::AppDelete,
        ],
        View::ProfileNew => &[
            ComponentId::ProfileType,
            ComponentId::BasicInfo,
            ComponentId::ImageUpload,
        ],
        View::Membership => &[ComponentId::Payment],
    }
}

fn login_error_message(error: &ApiError) -> String {
    match error.status() {
        Some(400..=499) => "Wrong email or password".to_string(),
        _ => error.to_string(),
    }
}

fn or_default(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Toasts shown over the current view
    pub notifier: Notifier,
    pub config: PortalConfig,
    /// Account backend
    api: Arc<dyn AccountApi>,
    /// In-flight requests, keyed by the component that owns them
    tasks: TaskRunner,
    /// Where to go once the profile arrives after logging in
    after_login: Option<(View, ViewParams)>,
    /// Whether the app should quit
    quit: bool,
    /// Copy feedback message
    pub copy_message: Option<String>,
    /// Terminal size (height, width)
    pub terminal_size: Option<(u16, u16)>,
}

impl App {
    pub fn new(config: PortalConfig, api: Arc<dyn AccountApi>) -> Self {
        let state = AppState::new(config.loader_delay());
        state.render.request();
        Self {
            state,
            notifier: Notifier::new(config.notification_timeout()),
            config,
            api,
            tasks: TaskRunner::new(),
            after_login: None,
            quit: false,
            copy_message: None,
            terminal_size: None,
        }
    }

    /// Create an App talking to the configured backend
    pub fn connect(config: PortalConfig) -> Result<Self> {
        let client = ApiClient::new(config.api_address(), config.request_timeout())?;
        tracing::info!("using account backend at {}", client.base_url());
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Whether anything changed since the last draw
    pub fn needs_redraw(&self) -> bool {
        self.state.render.take()
    }

    pub fn request_redraw(&self) {
        self.state.render.request();
    }

    /// Advance loaders and expire notifications
    pub fn tick(&mut self, now: Instant) {
        let loaders = self.state.tick(now);
        let toasts = self.notifier.prune(now);
        if loaders || toasts {
            self.state.render.request();
        }
    }

    /// Apply every task result that has arrived
    pub fn drain_tasks(&mut self) {
        while let Some(result) = self.tasks.try_recv() {
            self.apply_task_result(result);
        }
    }

    fn is_mounted(&self, owner: ComponentId) -> bool {
        let view = self.state.current_view;
        match owner {
            ComponentId::Session => true,
            ComponentId::AppDelete => view == View::Apps && self.state.apps.delete_form.is_some(),
            ComponentId::ImageUpload => {
                view == View::ProfileNew && self.state.profile_new.upload.is_some()
            }
            _ => components(view).contains(&owner),
        }
    }

    /// Navigate to a new view
    pub fn navigate(&mut self, view: View, params: ViewParams) {
        if view.requires_session() && !self.state.is_signed_in() {
            self.notifier
                .notify(NotificationKind::Error, "Please log in first");
            return;
        }
        self.unmount();
        self.state.view_history.push((
            self.state.current_view,
            std::mem::take(&mut self.state.view_params),
        ));
        self.state.current_view = view;
        self.state.view_params = params;
        self.mount(view);
    }

    /// Go back to previous view
    pub fn go_back(&mut self) {
        while let Some((view, params)) = self.state.view_history.pop() {
            if view == self.state.current_view
                || (view.requires_session() && !self.state.is_signed_in())
            {
                continue;
            }
            self.unmount();
            self.state.current_view = view;
            self.state.view_params = params;
            self.mount(view);
            return;
        }
    }

    /// Cancel the current view's requests and drop its overlays
    fn unmount(&mut self) {
        let view = self.state.current_view;
        tracing::debug!("unmounting {:?}", view);
        self.tasks.cancel_all(components(view).iter().copied());
        self.state.dialog = None;
    }

    fn mount(&mut self, view: View) {
        self.state.remount(view);
        match view {
            View::Account => {
                if let Some(profile) = self.state.profile.clone() {
                    self.load_account(&profile);
                }
            }
            View::Apps => self.load_apps(),
            View::Authorize => {
                let params = &self.state.view_params;
                let page = &mut self.state.authorize;
                page.load_query(params.authorize_query.as_deref().unwrap_or_default());
                page.application_name = params.application_name.clone().unwrap_or_default();
            }
            _ => {}
        }
    }

    fn load_account(&mut self, profile: &Profile) {
        let account = &mut self.state.account;
        account.load_profile(profile);
        if let Some(id) = self.state.active_usergroup.as_deref() {
            account.highlight_usergroup(id);
        }
    }

    fn end_session(&mut self) {
        self.unmount();
        self.state.profile = None;
        self.state.active_usergroup = None;
        self.after_login = None;
        self.state.view_history.clear();
        self.state.current_view = View::Login;
        self.state.view_params = ViewParams::default();
        self.mount(View::Login);
    }

    fn log_out(&mut self) {
        tracing::info!("logging out");
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::Session, async move {
            TaskOutcome::LoggedOut(api.logout().await)
        });
        self.end_session();
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.state.render.request();

        // Global quit: Ctrl+C
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return;
        }

        // Clear any status messages on key press
        self.copy_message = None;

        if let Some(dialog) = self.state.dialog.clone() {
            self.handle_dialog_key(dialog, key);
            return;
        }

        let signed_in = self.state.is_signed_in();
        if let KeyCode::F(n) = key.code {
            let target = (n as usize)
                .checked_sub(1)
                .and_then(|i| View::menu(signed_in).get(i))
                .copied();
            if let Some(view) = target.filter(|v| *v != self.state.current_view) {
                self.navigate(view, ViewParams::default());
            }
            return;
        }
        if signed_in && key.code == KeyCode::Char('o') && key.modifiers.contains(SHORTCUT_MODIFIER)
        {
            self.log_out();
            return;
        }

        match self.state.current_view {
            View::Login => self.handle_login_key(key),
            View::Signup => self.handle_signup_key(key),
            View::PasswordReset => self.handle_password_reset_key(key),
            View::Authorize => self.handle_authorize_key(key),
            View::Account => self.handle_account_key(key),
            View::Apps => self.handle_apps_key(key),
            View::ProfileNew => self.handle_profile_new_key(key),
            View::Membership => self.handle_membership_key(key),
        }
    }

    fn handle_dialog_key(&mut self, dialog: Dialog, key: KeyEvent) {
        match dialog {
            Dialog::DeleteAccount { confirm } => match key.code {
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Up
                | KeyCode::Down
                | KeyCode::Tab
                | KeyCode::BackTab => {
                    self.state.dialog = Some(Dialog::DeleteAccount { confirm: !confirm });
                }
                KeyCode::Char('y') => self.confirm_delete_account(),
                KeyCode::Enter if confirm => self.confirm_delete_account(),
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') => self.state.dialog = None,
                _ => {}
            },
            Dialog::LogoutPrompt { confirm } => match key.code {
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Up
                | KeyCode::Down
                | KeyCode::Tab
                | KeyCode::BackTab => {
                    self.state.dialog = Some(Dialog::LogoutPrompt { confirm: !confirm });
                }
                KeyCode::Char('y') => self.log_out(),
                KeyCode::Enter if confirm => self.log_out(),
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') => self.state.dialog = None,
                _ => {}
            },
            Dialog::AppSecret(app) => match key.code {
                KeyCode::Char('c') => {
                    let secret = app.secret.unwrap_or_default();
                    match self.copy_to_clipboard(&secret) {
                        Ok(()) => self.copy_message = Some("Client secret copied".to_string()),
                        Err(e) => self.push_error(format!("Could not copy the secret: {e}")),
                    }
                }
                KeyCode::Enter | KeyCode::Esc => self.state.dialog = None,
                _ => {}
            },
            Dialog::DeleteApp => {
                let Some(form) = self.state.apps.delete_form.as_mut() else {
                    self.state.dialog = None;
                    return;
                };
                match handle_form_key(form, key) {
                    FormAction::Submit => self.submit_delete_app(),
                    FormAction::Cancel => self.close_delete_app(),
                    _ => {}
                }
            }
            Dialog::ImageUpload => {
                let Some(upload) = self.state.profile_new.upload.as_mut() else {
                    self.state.dialog = None;
                    return;
                };
                match handle_form_key(&mut upload.form, key) {
                    FormAction::Submit => self.submit_image_probe(),
                    FormAction::Cancel => self.close_upload(),
                    _ => {}
                }
            }
            Dialog::ArtistMember => {
                let Some(form) = self.state.profile_new.member_form.as_mut() else {
                    self.state.dialog = None;
                    return;
                };
                match handle_form_key(form, key) {
                    FormAction::Submit => self.submit_artist_member(),
                    FormAction::Cancel => {
                        self.state.profile_new.close_member();
                        self.state.dialog = None;
                    }
                    _ => {}
                }
            }
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        if handle_form_key(&mut self.state.login, key) == FormAction::Submit {
            self.submit_login();
        }
    }

    fn handle_signup_key(&mut self, key: KeyEvent) {
        match handle_form_key(&mut self.state.signup, key) {
            FormAction::Submit => self.submit_signup(),
            FormAction::Cancel => self.go_back(),
            _ => {}
        }
    }

    fn handle_password_reset_key(&mut self, key: KeyEvent) {
        let page = &mut self.state.password_reset;
        if matches!(key.code, KeyCode::PageDown | KeyCode::PageUp) {
            return page.toggle_stage();
        }
        match handle_form_key(page.focused_form_mut(), key) {
            FormAction::Submit => match page.stage {
                ResetStage::Request => self.submit_password_reset(),
                ResetStage::Update => self.submit_password_reset_update(),
            },
            FormAction::Cancel => self.go_back(),
            _ => {}
        }
    }

    fn handle_authorize_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.state.authorize.toggle_choice();
            }
            KeyCode::Enter => self.submit_authorize(),
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn handle_account_key(&mut self, key: KeyEvent) {
        let account = &mut self.state.account;
        match key.code {
            KeyCode::PageDown => return account.next_section(),
            KeyCode::PageUp => return account.prev_section(),
            _ => {}
        }
        match account.section {
            AccountSection::Profile => {
                if handle_form_key(&mut account.profile_form, key) == FormAction::Submit {
                    self.submit_profile_update();
                }
            }
            AccountSection::Password => {
                if handle_form_key(&mut account.password_form, key) == FormAction::Submit {
                    self.submit_password_change();
                }
            }
            AccountSection::Usergroups => match key.code {
                KeyCode::Up | KeyCode::Char('k') => account.move_usergroup(-1),
                KeyCode::Down | KeyCode::Char('j') => account.move_usergroup(1),
                KeyCode::Enter => self.switch_usergroup(),
                _ => {}
            },
            AccountSection::Location => match key.code {
                KeyCode::Up => account.move_country(-1),
                KeyCode::Down => account.move_country(1),
                KeyCode::Enter => self.submit_country(),
                KeyCode::Char(c) if c.is_alphabetic() => account.jump_to_letter(c),
                _ => {}
            },
            AccountSection::Delete => {
                if key.code == KeyCode::Enter {
                    self.state.dialog = Some(Dialog::DeleteAccount { confirm: false });
                }
            }
        }
    }

    fn handle_apps_key(&mut self, key: KeyEvent) {
        let apps = &mut self.state.apps;
        if matches!(key.code, KeyCode::PageDown | KeyCode::PageUp) {
            return apps.toggle_focus();
        }
        match apps.focus {
            AppsFocus::List => match key.code {
                KeyCode::Up | KeyCode::Char('k') => apps.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => apps.select_next(),
                KeyCode::Char('d') | KeyCode::Delete => {
                    if apps.open_delete() {
                        self.state.dialog = Some(Dialog::DeleteApp);
                    }
                }
                KeyCode::Char('r') => self.load_apps(),
                _ => {}
            },
            AppsFocus::Register => match handle_form_key(&mut apps.register_form, key) {
                FormAction::Submit => self.submit_register_app(),
                FormAction::Cancel => apps.toggle_focus(),
                _ => {}
            },
        }
    }

    fn handle_profile_new_key(&mut self, key: KeyEvent) {
        let page = &mut self.state.profile_new;
        match page.step() {
            ProfileStep::ProfileType => match key.code {
                KeyCode::Up | KeyCode::Char('k') => page.prev_type(),
                KeyCode::Down | KeyCode::Char('j') => page.next_type(),
                KeyCode::Enter => self.submit_profile_type(),
                _ => {}
            },
            ProfileStep::BasicInfo => match handle_form_key(&mut page.basic_info, key) {
                FormAction::Submit => self.submit_basic_info(),
                FormAction::Cancel => {
                    page.steps.emit(StepEvent::Prev);
                }
                FormAction::Upload(field) => {
                    if let Some(target) = ImageTarget::from_field(&field) {
                        page.open_upload(target);
                        self.state.dialog = Some(Dialog::ImageUpload);
                    }
                }
                FormAction::None => {}
            },
            ProfileStep::Recap => match key.code {
                KeyCode::Esc | KeyCode::Backspace => {
                    page.steps.emit(StepEvent::Prev);
                }
                KeyCode::Char('m') => {
                    if page.open_member() {
                        self.state.dialog = Some(Dialog::ArtistMember);
                    }
                }
                KeyCode::Enter => {
                    self.notifier
                        .notify(NotificationKind::Info, "Your profile is ready");
                    self.navigate(View::Account, ViewParams::default());
                }
                _ => {}
            },
        }
    }

    fn handle_membership_key(&mut self, key: KeyEvent) {
        if handle_form_key(&mut self.state.membership, key) == FormAction::Submit {
            self.submit_payment();
        }
    }

    fn submit_login(&mut self) {
        let form = &mut self.state.login;
        if !begin_submit(form) {
            return;
        }
        let request = LoginRequest {
            email: form.value("email").to_string(),
            password: form.value("password").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::Login, async move {
            TaskOutcome::Login(api.login(request).await)
        });
    }

    fn submit_signup(&mut self) {
        let form = &mut self.state.signup;
        if !begin_submit(form) {
            return;
        }
        let request = JoinRequest {
            email: form.value("email").to_string(),
            login: form.value("login").to_string(),
            password: form.value("password").to_string(),
            display_name: form.value("display_name").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::Signup, async move {
            TaskOutcome::Joined(api.join(request).await)
        });
    }

    fn submit_password_reset(&mut self) {
        let form = &mut self.state.password_reset.request;
        if !begin_submit(form) {
            return;
        }
        let email = form.value("email").to_string();
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::PasswordReset, async move {
            TaskOutcome::PasswordResetRequested(api.request_password_reset(email).await)
        });
    }

    fn submit_password_reset_update(&mut self) {
        let form = &mut self.state.password_reset.update;
        if !begin_submit(form) {
            return;
        }
        let update = PasswordResetUpdate {
            token: form.value("token").trim().to_string(),
            password_new: form.value("password_new").to_string(),
            password_confirm: form.value("password_confirm").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::PasswordResetUpdate, async move {
            TaskOutcome::PasswordResetCompleted(api.complete_password_reset(update).await)
        });
    }

    fn submit_authorize(&mut self) {
        let page = &mut self.state.authorize;
        if page.client_id.is_empty() {
            self.push_error("No application is waiting for authorization");
            return;
        }
        if !page.request.start_request(Instant::now()) {
            return;
        }
        let request = AuthorizeRequest {
            query: page.query.clone(),
            allow: page.allow,
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::Authorize, async move {
            TaskOutcome::Authorized(api.authorize(request).await)
        });
    }

    fn submit_profile_update(&mut self) {
        let form = &mut self.state.account.profile_form;
        if !begin_submit(form) {
            return;
        }
        let update = ProfileUpdate {
            email: Some(form.value("email").to_string()),
            nickname: Some(form.value("displayName").to_string()),
            ..ProfileUpdate::default()
        };
        self.spawn_profile_update(ComponentId::AccountProfile, update);
    }

    fn submit_country(&mut self) {
        let account = &mut self.state.account;
        if !account.country_changed() || !account.location.start_request(Instant::now()) {
            return;
        }
        let (_, name) = account.highlighted_country();
        self.spawn_profile_update(ComponentId::AccountLocation, ProfileUpdate::country(name));
    }

    fn submit_profile_type(&mut self) {
        let page = &mut self.state.profile_new;
        if page.profile_type.is_paused() {
            self.notifier.notify(
                NotificationKind::Info,
                "Label accounts are paused for now. Join as an artist or a listener.",
            );
            return;
        }
        if !page.type_request.start_request(Instant::now()) {
            return;
        }
        let update = ProfileUpdate::role(page.profile_type.role());
        self.spawn_profile_update(ComponentId::ProfileType, update);
    }

    fn spawn_profile_update(&mut self, owner: ComponentId, update: ProfileUpdate) {
        let api = self.api.clone();
        self.tasks.spawn(owner, async move {
            TaskOutcome::ProfileUpdated(api.update_profile(update).await)
        });
    }

    fn submit_password_change(&mut self) {
        let form = &mut self.state.account.password_form;
        if !begin_submit(form) {
            return;
        }
        let change = PasswordChange {
            password: form.value("password").to_string(),
            password_new: form.value("password_new").to_string(),
            password_confirm: form.value("password_confirm").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::AccountPassword, async move {
            TaskOutcome::PasswordUpdated(api.update_password(change).await)
        });
    }

    fn confirm_delete_account(&mut self) {
        self.state.dialog = None;
        if !self.state.account.deletion.start_request(Instant::now()) {
            return;
        }
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::AccountDelete, async move {
            TaskOutcome::AccountDeleted(api.delete_account().await)
        });
    }

    fn load_apps(&mut self) {
        if !self.state.apps.list.start_request(Instant::now()) {
            return;
        }
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::AppList, async move {
            TaskOutcome::AppsLoaded(api.list_apps().await)
        });
    }

    fn submit_register_app(&mut self) {
        let form = &mut self.state.apps.register_form;
        if !begin_submit(form) {
            return;
        }
        let app = AppRegistration {
            application_name: form.value("application_name").to_string(),
            redirect_uri: form.value("redirect_uri").to_string(),
            application_url: form.value("application_url").to_string(),
            application_hostname: form.value("application_hostname").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::AppRegister, async move {
            TaskOutcome::AppRegistered(api.register_app(app).await)
        });
    }

    fn submit_delete_app(&mut self) {
        let apps = &mut self.state.apps;
        let (Some(form), Some(target)) = (apps.delete_form.as_mut(), apps.delete_target.as_ref())
        else {
            return;
        };
        if !begin_submit(form) {
            return;
        }
        let request = AppDeletion {
            client_id: target.client_id.clone(),
            application_name: form.value("application_name").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::AppDelete, async move {
            TaskOutcome::AppDeleted(api.delete_app(request).await)
        });
    }

    fn close_delete_app(&mut self) {
        self.tasks.cancel(ComponentId::AppDelete);
        self.state.apps.close_delete();
        self.state.dialog = None;
    }

    /// The step only advances once the profile has stored the info
    fn submit_basic_info(&mut self) {
        let form = &mut self.state.profile_new.basic_info;
        if !begin_submit(form) {
            return;
        }
        let info = BasicInfo {
            nickname: form.value("name").to_string(),
            city: form.value("location").to_string(),
            bio: form.value("bio").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::BasicInfo, async move {
            TaskOutcome::BasicInfoSaved(api.update_basic_info(info).await)
        });
    }

    fn submit_artist_member(&mut self) {
        let page = &mut self.state.profile_new;
        let Some(form) = page.member_form.as_mut() else {
            return;
        };
        if !begin_submit(form) {
            return;
        }
        form.succeed();
        if let Some(member) = page.add_member() {
            let message = format!("{} added as {}", member.display_name, member.role);
            self.notifier.notify(NotificationKind::Info, message);
        }
        self.state.dialog = None;
    }

    fn switch_usergroup(&mut self) {
        let Some(group) = self.state.account.highlighted_usergroup() else {
            return;
        };
        let (id, name) = (group.id.clone(), group.display_name.clone());
        if self.state.active_usergroup.as_deref() == Some(id.as_str()) {
            return;
        }
        tracing::info!("acting as usergroup {}", id);
        self.state.active_usergroup = Some(id);
        self.notifier
            .notify(NotificationKind::Info, format!("Switched to {name}"));
    }

    fn submit_image_probe(&mut self) {
        let Some(upload) = self.state.profile_new.upload.as_mut() else {
            return;
        };
        if !begin_submit(&mut upload.form) {
            return;
        }
        upload.probed = None;
        let path = expand_home(upload.form.value("path").trim());
        self.tasks.spawn(ComponentId::ImageUpload, async move {
            TaskOutcome::ImageProbed(upload::probe_file(path).await)
        });
    }

    fn close_upload(&mut self) {
        self.tasks.cancel(ComponentId::ImageUpload);
        self.state.profile_new.close_upload();
        self.state.dialog = None;
    }

    fn submit_payment(&mut self) {
        let form = &mut self.state.membership;
        if !begin_submit(form) {
            return;
        }
        let card = PaymentMethod {
            name: form.value("name").to_string(),
            number: form.value("number").to_string(),
            expiration: form.value("expiration").to_string(),
            cvc: form.value("cvc").to_string(),
        };
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::Payment, async move {
            TaskOutcome::PaymentSaved(api.save_payment_method(card).await)
        });
    }

    /// Apply a finished task to the component that started it. Results for
    /// components that are no longer mounted are dropped.
    pub fn apply_task_result(&mut self, result: TaskResult) {
        let TaskResult { owner, outcome } = result;
        if !self.is_mounted(owner) {
            tracing::debug!("dropping result for unmounted {:?}", owner);
            return;
        }
        self.state.render.request();

        match outcome {
            TaskOutcome::Login(Ok(outcome)) => self.on_logged_in(outcome),
            TaskOutcome::Login(Err(e)) => {
                tracing::warn!("login failed: {}", e);
                self.state.login.fail(login_error_message(&e));
            }
            TaskOutcome::Joined(Ok(message)) => {
                self.state.signup.succeed();
                self.notifier.notify(
                    NotificationKind::Info,
                    or_default(message.message, "Your account has been created"),
                );
                self.navigate(View::Login, ViewParams::default());
            }
            TaskOutcome::Joined(Err(e)) => self.state.signup.fail(e.to_string()),
            TaskOutcome::PasswordResetRequested(Ok(message)) => {
                let page = &mut self.state.password_reset;
                page.request.succeed();
                page.stage = ResetStage::Update;
                page.update.set_status(
                    NotificationKind::Info,
                    or_default(message.message, "Check your inbox for a reset link"),
                );
            }
            TaskOutcome::PasswordResetRequested(Err(e)) => {
                self.state.password_reset.request.fail(e.to_string())
            }
            TaskOutcome::PasswordResetCompleted(Ok(message)) => {
                self.state.password_reset.update.succeed();
                self.notifier.notify(
                    NotificationKind::Info,
                    or_default(message.message, "Your password was updated successfully."),
                );
                self.navigate(View::Login, ViewParams::default());
            }
            TaskOutcome::PasswordResetCompleted(Err(e)) => {
                self.state.password_reset.update.fail(e.to_string());
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            TaskOutcome::Authorized(Ok(redirect)) => {
                self.state.authorize.request.resolve();
                let message = if redirect.query_param("error").as_deref() == Some("access_denied")
                {
                    "Access denied".to_string()
                } else {
                    format!("Redirecting to {}", redirect.location)
                };
                self.notifier.notify(NotificationKind::Info, message);
                self.state.authorize.redirect = Some(redirect);
            }
            TaskOutcome::Authorized(Err(e)) => {
                self.state.authorize.request.reject();
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            TaskOutcome::ProfileLoaded(Ok(profile)) => self.on_profile_loaded(profile),
            TaskOutcome::ProfileLoaded(Err(e)) => {
                if self.state.login.is_loading() {
                    self.state.login.fail(e.to_string());
                } else {
                    self.notifier.notify(NotificationKind::Error, e.to_string());
                }
            }
            TaskOutcome::ProfileUpdated(result) => self.on_profile_updated(owner, result),
            TaskOutcome::BasicInfoSaved(Ok(_)) => {
                let page = &mut self.state.profile_new;
                page.basic_info.succeed();
                let name = page.basic_info.value("name").to_string();
                page.steps.emit(StepEvent::Next);
                if let Some(profile) = self.state.profile.as_mut() {
                    profile.display_name = name;
                }
            }
            TaskOutcome::BasicInfoSaved(Err(e)) => {
                self.state.profile_new.basic_info.fail(e.to_string());
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            TaskOutcome::PasswordUpdated(Ok(_)) => {
                self.state.account.password_form.reset();
                self.notifier
                    .notify(NotificationKind::Info, "Your password has been changed.");
                self.state.dialog = Some(Dialog::LogoutPrompt { confirm: false });
            }
            TaskOutcome::PasswordUpdated(Err(e)) => {
                self.state.account.password_form.fail(e.to_string());
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            TaskOutcome::AccountDeleted(Ok(_)) => {
                self.state.account.deletion.resolve();
                self.notifier.notify_for(
                    NotificationKind::Info,
                    DELETION_NOTICE,
                    DELETION_NOTICE_TIMEOUT,
                );
                self.log_out();
            }
            TaskOutcome::AccountDeleted(Err(e)) => {
                self.state.account.deletion.reject();
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            TaskOutcome::AppsLoaded(Ok(apps)) => {
                self.state.apps.list.resolve();
                self.state.apps.set_apps(apps);
            }
            TaskOutcome::AppsLoaded(Err(e)) => {
                self.state.apps.list.reject();
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            TaskOutcome::AppRegistered(Ok(app)) => {
                let apps = &mut self.state.apps;
                apps.register_form.reset();
                apps.push_app(&app);
                self.state.dialog = Some(Dialog::AppSecret(app));
            }
            TaskOutcome::AppRegistered(Err(e)) => {
                self.state.apps.register_form.fail(e.to_string())
            }
            TaskOutcome::AppDeleted(Ok(message)) => {
                let apps = &mut self.state.apps;
                if let Some(target) = apps.delete_target.take() {
                    apps.remove_app(&target.client_id);
                    let fallback = format!("{} has been deleted", target.application_name);
                    self.notifier
                        .notify(NotificationKind::Info, or_default(message.message, &fallback));
                }
                self.close_delete_app();
            }
            TaskOutcome::AppDeleted(Err(e)) => {
                if let Some(form) = self.state.apps.delete_form.as_mut() {
                    form.fail(e.to_string());
                }
            }
            TaskOutcome::ImageProbed(Ok(image)) => self.on_image_probed(image),
            TaskOutcome::ImageProbed(Err(e)) => {
                if let Some(upload) = self.state.profile_new.upload.as_mut() {
                    upload.form.fail(e.to_string());
                }
            }
            TaskOutcome::ImageUploaded(Ok(uploaded)) => {
                let page = &mut self.state.profile_new;
                let Some(target) = page.upload.as_ref().map(|u| u.target) else {
                    return;
                };
                page.apply_upload(target, &uploaded.filename);
                self.state.dialog = None;
                self.notifier
                    .notify(NotificationKind::Info, format!("{} uploaded", target.label()));
            }
            TaskOutcome::ImageUploaded(Err(e)) => {
                if let Some(upload) = self.state.profile_new.upload.as_mut() {
                    upload.form.fail(e.to_string());
                }
            }
            TaskOutcome::PaymentSaved(Ok(message)) => {
                self.state.membership.reset();
                self.notifier.notify(
                    NotificationKind::Info,
                    or_default(message.message, "Your payment method has been saved"),
                );
            }
            TaskOutcome::PaymentSaved(Err(e)) => self.state.membership.fail(e.to_string()),
            TaskOutcome::LoggedOut(Ok(())) => tracing::debug!("session closed on the server"),
            TaskOutcome::LoggedOut(Err(e)) => tracing::warn!("logout request failed: {}", e),
        }
    }

    fn on_logged_in(&mut self, outcome: LoginOutcome) {
        if let LoginOutcome::Redirected(redirect) = &outcome {
            tracing::debug!("login redirected to {}", redirect.location);
            if redirect.location.contains("/authorize") {
                let params = ViewParams {
                    authorize_query: redirect.query(),
                    application_name: None,
                };
                self.after_login = Some((View::Authorize, params));
            }
        }
        // The login form keeps loading until the profile arrives
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::Session, async move {
            TaskOutcome::ProfileLoaded(api.fetch_profile().await)
        });
    }

    fn on_profile_loaded(&mut self, profile: Profile) {
        let first = self.state.profile.is_none();
        tracing::info!("signed in as account {}", profile.id);
        let owned = |id: &String| profile.usergroups.iter().any(|g| &g.id == id);
        if !self.state.active_usergroup.as_ref().is_some_and(owned) {
            self.state.active_usergroup = profile.usergroups.first().map(|g| g.id.clone());
        }
        if self.state.current_view == View::Account {
            self.load_account(&profile);
        }
        self.state.profile = Some(profile);
        if !first {
            return;
        }
        if self.state.login.is_loading() {
            self.state.login.succeed();
        }
        let (view, params) = self
            .after_login
            .take()
            .unwrap_or((View::Account, ViewParams::default()));
        self.navigate(view, params);
        self.state.view_history.clear();
    }

    fn on_profile_updated(
        &mut self,
        owner: ComponentId,
        result: Result<ApiMessage, ApiError>,
    ) {
        match (owner, result) {
            (ComponentId::AccountProfile, Ok(_)) => {
                let form = &mut self.state.account.profile_form;
                form.mark_saved();
                let email = form.value("email").to_string();
                let name = form.value("displayName").to_string();
                if let Some(profile) = self.state.profile.as_mut() {
                    profile.email = email;
                    profile.display_name = name;
                }
                self.notifier.notify(
                    NotificationKind::Info,
                    "Your account info has been successfully updated",
                );
            }
            (ComponentId::AccountProfile, Err(e)) => {
                self.state.account.profile_form.fail(e.to_string());
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            (ComponentId::AccountLocation, Ok(message)) => {
                let account = &mut self.state.account;
                account.location.resolve();
                account.saved_country = Some(account.country_cursor);
                let (_, name) = account.highlighted_country();
                if let Some(profile) = self.state.profile.as_mut() {
                    profile.country = Some(name.to_string());
                }
                self.notifier.notify(
                    NotificationKind::Info,
                    or_default(message.message, "Your location has been updated"),
                );
            }
            (ComponentId::AccountLocation, Err(e)) => {
                self.state.account.location.reject();
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            (ComponentId::ProfileType, Ok(_)) => {
                let page = &mut self.state.profile_new;
                page.type_request.resolve();
                let role = page.profile_type.role();
                page.steps.emit(StepEvent::Next);
                if let Some(profile) = self.state.profile.as_mut() {
                    profile.role = Some(role.to_string());
                }
            }
            (ComponentId::ProfileType, Err(e)) => {
                self.state.profile_new.type_request.reject();
                self.notifier.notify(NotificationKind::Error, e.to_string());
            }
            (other, _) => tracing::debug!("profile update result for {:?} ignored", other),
        }
    }

    fn on_image_probed(&mut self, image: ProbedImage) {
        let Some(upload) = self.state.profile_new.upload.as_mut() else {
            return;
        };
        upload.form.validator.validate("inputFile", image.dimensions());
        if let Some(error) = upload.form.visible_error("inputFile") {
            let message = error.message.clone();
            upload.form.fail(message);
            return;
        }
        tracing::debug!(
            "uploading {} ({}x{})",
            image.file_name,
            image.width,
            image.height
        );
        let file = image.clone().into_upload();
        upload.probed = Some(image);
        let api = self.api.clone();
        self.tasks.spawn(ComponentId::ImageUpload, async move {
            TaskOutcome::ImageUploaded(api.upload_image(file).await)
        });
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        use arboard::Clipboard;
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAccountApi;
    use crate::state::{upload::fixtures, Redirect, RegisteredApp, UploadedImage, Usergroup};
    use pretty_assertions::assert_eq;

    fn app_with(api: MockAccountApi) -> App {
        App::new(PortalConfig::default(), Arc::new(api))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Type each value into consecutive fields
    fn fill(app: &mut App, values: &[&str]) {
        for value in values {
            type_text(app, value);
            press(app, KeyCode::Tab);
        }
    }

    async fn settle(app: &mut App) {
        let result = tokio::time::timeout(Duration::from_secs(2), app.tasks.recv())
            .await
            .expect("task did not finish")
            .expect("task channel closed");
        app.apply_task_result(result);
    }

    fn sample_profile() -> Profile {
        Profile {
            id: 7,
            email: "ada@example.org".to_string(),
            display_name: "Ada".to_string(),
            email_confirmed: true,
            country: Some("Belgium".to_string()),
            role: None,
            usergroups: Vec::new(),
        }
    }

    fn signed_in(app: &mut App, view: View) {
        app.state.profile = Some(sample_profile());
        app.navigate(view, ViewParams::default());
    }

    fn latest_toast(app: &App) -> Option<&str> {
        app.notifier.latest().map(|n| n.message.as_str())
    }

    mod login {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_invalid_input_sends_nothing() {
            let mut api = MockAccountApi::new();
            api.expect_login().times(0);
            let mut app = app_with(api);

            type_text(&mut app, "bad");
            ctrl(&mut app, 's');

            let form = &app.state.login;
            assert_eq!(
                form.visible_error("email").map(|e| e.message.as_str()),
                Some("Email is invalid")
            );
            assert_eq!(
                form.visible_error("password").map(|e| e.message.as_str()),
                Some("Password is required")
            );
            assert_eq!(form.active_field_name(), Some("email"));
            assert!(!app.tasks.has_tasks(ComponentId::Login));
        }

        #[tokio::test]
        async fn test_success_fetches_profile_and_opens_account() {
            let mut api = MockAccountApi::new();
            api.expect_login()
                .times(1)
                .withf(|r| r.email == "ada@example.org" && r.password == "hunter22")
                .returning(|_| Ok(LoginOutcome::Authenticated));
            api.expect_fetch_profile()
                .times(1)
                .returning(|| Ok(sample_profile()));
            let mut app = app_with(api);

            fill(&mut app, &["ada@example.org", "hunter22"]);
            press(&mut app, KeyCode::Enter);
            assert!(app.state.login.is_loading());

            settle(&mut app).await;
            settle(&mut app).await;

            assert_eq!(app.state.current_view, View::Account);
            assert_eq!(app.state.account.profile_form.value("displayName"), "Ada");
            assert_eq!(app.state.account.highlighted_country().1, "Belgium");
            assert!(app.state.view_history.is_empty());
        }

        #[tokio::test]
        async fn test_wrong_credentials_keep_input() {
            let mut api = MockAccountApi::new();
            api.expect_login().times(1).returning(|_| {
                Err(ApiError::Rejected {
                    status: 401,
                    message: "invalid credentials".to_string(),
                })
            });
            let mut app = app_with(api);

            fill(&mut app, &["ada@example.org", "hunter22"]);
            ctrl(&mut app, 's');
            settle(&mut app).await;

            let form = &app.state.login;
            assert_eq!(
                form.status.as_ref().map(|s| s.text.as_str()),
                Some("Wrong email or password")
            );
            assert_eq!(form.value("email"), "ada@example.org");
            assert!(!form.is_loading());
        }

        #[tokio::test]
        async fn test_authorize_redirect_resumes_consent() {
            const QUERY: &str = "client_id=player-app&redirect_uri=https%3A%2F%2Fplayer.example.org%2Fcb\
                                 &response_type=code&state=xyz123&scope=read_write";
            let mut api = MockAccountApi::new();
            api.expect_login().returning(|_| {
                Ok(LoginOutcome::Redirected(Redirect {
                    location: format!("/web/authorize?{QUERY}"),
                }))
            });
            api.expect_fetch_profile().returning(|| Ok(sample_profile()));
            api.expect_authorize()
                .times(1)
                .withf(|r| r.query == QUERY && r.allow)
                .returning(|_| {
                    Ok(Redirect {
                        location: "https://player.example.org/cb?code=abc&state=xyz123"
                            .to_string(),
                    })
                });
            let mut app = app_with(api);

            fill(&mut app, &["ada@example.org", "hunter22"]);
            ctrl(&mut app, 's');
            settle(&mut app).await;
            settle(&mut app).await;

            assert_eq!(app.state.current_view, View::Authorize);
            assert_eq!(app.state.authorize.client_id, "player-app");

            press(&mut app, KeyCode::Enter);
            settle(&mut app).await;
            assert_eq!(
                app.state.authorize.redirect.as_ref().and_then(|r| r.query_param("state")),
                Some("xyz123".to_string())
            );
        }
    }

    mod signup {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_created_account_returns_to_login() {
            let mut api = MockAccountApi::new();
            api.expect_join()
                .times(1)
                .withf(|r| r.login == "ada" && r.display_name == "Ada Lovelace")
                .returning(|_| {
                    Ok(ApiMessage {
                        message: "Welcome aboard".to_string(),
                        status: Some(201),
                    })
                });
            let mut app = app_with(api);

            press(&mut app, KeyCode::F(2));
            assert_eq!(app.state.current_view, View::Signup);
            fill(
                &mut app,
                &["ada@example.org", "ada", "correct-horse", "Ada Lovelace"],
            );
            press(&mut app, KeyCode::Enter);
            settle(&mut app).await;

            assert_eq!(app.state.current_view, View::Login);
            assert_eq!(latest_toast(&app), Some("Welcome aboard"));
        }

        #[tokio::test]
        async fn test_short_password_blocks_request() {
            let mut api = MockAccountApi::new();
            api.expect_join().times(0);
            let mut app = app_with(api);

            press(&mut app, KeyCode::F(2));
            fill(&mut app, &["ada@example.org", "ada", "short", "Ada"]);
            press(&mut app, KeyCode::Enter);

            assert_eq!(app.state.signup.active_field_name(), Some("password"));
            assert!(!app.tasks.has_tasks(ComponentId::Signup));
        }
    }

    mod password_reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_request_moves_to_token_entry() {
            let mut api = MockAccountApi::new();
            api.expect_request_password_reset()
                .times(1)
                .withf(|email| email == "ada@example.org")
                .returning(|_| Ok(ApiMessage::new("We have sent you a password reset link")));
            let mut app = app_with(api);

            press(&mut app, KeyCode::F(3));
            type_text(&mut app, "ada@example.org");
            ctrl(&mut app, 's');
            settle(&mut app).await;

            let page = &app.state.password_reset;
            assert_eq!(page.stage, ResetStage::Update);
            assert_eq!(
                page.update.status.as_ref().map(|s| s.text.as_str()),
                Some("We have sent you a password reset link")
            );
        }

        #[tokio::test]
        async fn test_token_completion_returns_to_login() {
            let mut api = MockAccountApi::new();
            api.expect_complete_password_reset()
                .times(1)
                .withf(|u| u.token == "d2f9c1" && u.password_new == "new-password-1")
                .returning(|_| {
                    Ok(ApiMessage::new(
                        "Your password was updated successfully. \
                         A confirmation email has been sent.",
                    ))
                });
            let mut app = app_with(api);

            press(&mut app, KeyCode::F(3));
            press(&mut app, KeyCode::PageDown);
            fill(&mut app, &[" d2f9c1 ", "new-password-1", "new-password-1"]);
            ctrl(&mut app, 's');
            settle(&mut app).await;

            assert_eq!(app.state.current_view, View::Login);
            assert!(latest_toast(&app).is_some_and(|m| m.starts_with("Your password was updated")));
        }

        #[tokio::test]
        async fn test_rejected_token_keeps_input() {
            let mut api = MockAccountApi::new();
            api.expect_complete_password_reset().times(1).returning(|_| {
                Err(ApiError::Rejected {
                    status: 400,
                    message: "Token expired".to_string(),
                })
            });
            let mut app = app_with(api);

            press(&mut app, KeyCode::F(3));
            press(&mut app, KeyCode::PageDown);
            fill(&mut app, &["stale", "new-password-1", "new-password-1"]);
            ctrl(&mut app, 's');
            settle(&mut app).await;

            let form = &app.state.password_reset.update;
            assert_eq!(app.state.current_view, View::PasswordReset);
            assert_eq!(
                form.status.as_ref().map(|s| s.text.as_str()),
                Some("Token expired")
            );
            assert_eq!(form.value("token"), "stale");
            assert_eq!(latest_toast(&app), Some("Token expired"));
        }
    }

    mod mounting {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_result_for_unmounted_component_is_dropped() {
            let mut app = app_with(MockAccountApi::new());
            app.apply_task_result(TaskResult {
                owner: ComponentId::Signup,
                outcome: TaskOutcome::Joined(Ok(ApiMessage::new("Welcome"))),
            });
            assert_eq!(app.state.current_view, View::Login);
            assert!(app.notifier.latest().is_none());
        }

        #[tokio::test]
        async fn test_navigation_cancels_owned_tasks() {
            let mut app = app_with(MockAccountApi::new());
            app.tasks.spawn(ComponentId::Login, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                TaskOutcome::LoggedOut(Ok(()))
            });
            app.navigate(View::Signup, ViewParams::default());
            assert!(!app.tasks.has_tasks(ComponentId::Login));
        }

        #[tokio::test]
        async fn test_session_views_need_login() {
            let mut app = app_with(MockAccountApi::new());
            app.navigate(View::Account, ViewParams::default());
            assert_eq!(app.state.current_view, View::Login);
            assert_eq!(latest_toast(&app), Some("Please log in first"));
        }

        #[tokio::test]
        async fn test_go_back_remounts_previous_view() {
            let mut app = app_with(MockAccountApi::new());
            type_text(&mut app, "ada@example.org");
            press(&mut app, KeyCode::F(3));
            assert_eq!(app.state.current_view, View::PasswordReset);
            press(&mut app, KeyCode::Esc);
            assert_eq!(app.state.current_view, View::Login);
            assert_eq!(app.state.login.value("email"), "");
        }
    }

    mod account {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_delete_account_logs_out_with_notice() {
            let mut api = MockAccountApi::new();
            api.expect_delete_account()
                .times(1)
                .returning(|| Ok(ApiMessage::new("")));
            api.expect_logout().times(1).returning(|| Ok(()));
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);

            for _ in 0..4 {
                press(&mut app, KeyCode::PageDown);
            }
            assert_eq!(app.state.account.section, AccountSection::Delete);
            press(&mut app, KeyCode::Enter);
            assert_eq!(
                app.state.dialog,
                Some(Dialog::DeleteAccount { confirm: false })
            );
            press(&mut app, KeyCode::Char('y'));
            settle(&mut app).await;

            assert_eq!(app.state.current_view, View::Login);
            assert!(!app.state.is_signed_in());
            let toast = app.notifier.latest().unwrap();
            assert_eq!(toast.message, DELETION_NOTICE);
            assert!(toast.expires_at > Instant::now() + Duration::from_secs(9));

            settle(&mut app).await;
        }

        #[tokio::test]
        async fn test_cancel_delete_dialog() {
            let mut api = MockAccountApi::new();
            api.expect_delete_account().times(0);
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);
            app.state.account.section = AccountSection::Delete;

            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Enter);
            assert!(app.state.dialog.is_none());
        }

        #[tokio::test]
        async fn test_password_change_offers_logout() {
            let mut api = MockAccountApi::new();
            api.expect_update_password()
                .times(1)
                .withf(|c| c.password_new == c.password_confirm)
                .returning(|_| Ok(ApiMessage::new("")));
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);
            app.state.account.section = AccountSection::Password;

            fill(&mut app, &["old-password", "new-password-1", "new-password-1"]);
            ctrl(&mut app, 's');
            settle(&mut app).await;

            assert_eq!(
                app.state.dialog,
                Some(Dialog::LogoutPrompt { confirm: false })
            );
            assert_eq!(latest_toast(&app), Some("Your password has been changed."));
            assert_eq!(app.state.account.password_form.value("password"), "");
        }

        #[tokio::test]
        async fn test_mismatched_confirmation_blocks_request() {
            let mut api = MockAccountApi::new();
            api.expect_update_password().times(0);
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);
            app.state.account.section = AccountSection::Password;

            fill(&mut app, &["old-password", "new-password-1", "new-password-2"]);
            ctrl(&mut app, 's');

            let form = &app.state.account.password_form;
            assert_eq!(
                form.visible_error("password_confirm").map(|e| e.message.as_str()),
                Some("Password mismatch")
            );
            assert_eq!(form.active_field_name(), Some("password_confirm"));
        }

        #[tokio::test]
        async fn test_country_change_sends_name() {
            let mut api = MockAccountApi::new();
            api.expect_update_profile()
                .times(1)
                .withf(|u| u.country.as_deref() == Some("Belize") && u.email.is_none())
                .returning(|_| Ok(ApiMessage::new("")));
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);
            app.state.account.section = AccountSection::Location;

            press(&mut app, KeyCode::Down);
            press(&mut app, KeyCode::Enter);
            settle(&mut app).await;

            assert!(!app.state.account.country_changed());
            assert_eq!(
                app.state.profile.as_ref().and_then(|p| p.country.as_deref()),
                Some("Belize")
            );
        }

        #[tokio::test]
        async fn test_profile_update_error_is_notified() {
            let mut api = MockAccountApi::new();
            api.expect_update_profile().times(1).returning(|_| {
                Err(ApiError::Rejected {
                    status: 400,
                    message: "Email already taken".to_string(),
                })
            });
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);

            type_text(&mut app, "x");
            ctrl(&mut app, 's');
            settle(&mut app).await;

            let form = &app.state.account.profile_form;
            assert_eq!(
                form.status.as_ref().map(|s| s.text.as_str()),
                Some("Email already taken")
            );
            assert_eq!(latest_toast(&app), Some("Email already taken"));
        }

        #[tokio::test]
        async fn test_password_update_error_is_notified() {
            let mut api = MockAccountApi::new();
            api.expect_update_password().times(1).returning(|_| {
                Err(ApiError::Rejected {
                    status: 400,
                    message: "Invalid password".to_string(),
                })
            });
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);
            app.state.account.section = AccountSection::Password;

            fill(&mut app, &["old-password", "new-password-1", "new-password-1"]);
            ctrl(&mut app, 's');
            settle(&mut app).await;

            assert!(app.state.dialog.is_none());
            assert_eq!(latest_toast(&app), Some("Invalid password"));
        }

        #[tokio::test]
        async fn test_switch_usergroup() {
            let mut app = app_with(MockAccountApi::new());
            let mut profile = sample_profile();
            profile.usergroups = vec![
                Usergroup {
                    id: "ug-1".to_string(),
                    display_name: "The Engines".to_string(),
                    ..Usergroup::default()
                },
                Usergroup {
                    id: "ug-2".to_string(),
                    display_name: "Analytical".to_string(),
                    ..Usergroup::default()
                },
            ];
            app.on_profile_loaded(profile);
            assert_eq!(app.state.current_view, View::Account);
            assert_eq!(app.state.active_usergroup.as_deref(), Some("ug-1"));

            press(&mut app, KeyCode::PageDown);
            assert_eq!(app.state.account.section, AccountSection::Usergroups);
            press(&mut app, KeyCode::Down);
            press(&mut app, KeyCode::Enter);

            assert_eq!(app.state.active_usergroup.as_deref(), Some("ug-2"));
            assert_eq!(app.state.persona_name(), Some("Analytical"));
            assert_eq!(latest_toast(&app), Some("Switched to Analytical"));
        }

        #[tokio::test]
        async fn test_unchanged_profile_form_does_not_submit() {
            let mut api = MockAccountApi::new();
            api.expect_update_profile().times(0);
            let mut app = app_with(api);
            signed_in(&mut app, View::Account);

            let form = &mut app.state.account.profile_form;
            form.active_field_index = form.fields.len();
            press(&mut app, KeyCode::Enter);
            assert!(!app.tasks.has_tasks(ComponentId::AccountProfile));
        }
    }

    mod apps {
        use super::*;
        use pretty_assertions::assert_eq;

        fn listed() -> RegisteredApp {
            RegisteredApp {
                client_id: "player".to_string(),
                application_name: "Player".to_string(),
                ..RegisteredApp::default()
            }
        }

        #[tokio::test]
        async fn test_register_shows_secret_once() {
            let mut api = MockAccountApi::new();
            api.expect_list_apps().times(1).returning(|| Ok(Vec::new()));
            api.expect_register_app().times(1).returning(|app| {
                Ok(RegisteredApp {
                    client_id: "new-client".to_string(),
                    secret: Some("s3cr3t".to_string()),
                    application_name: app.application_name,
                    application_hostname: app.application_hostname,
                    application_url: app.application_url,
                    redirect_uri: Some(app.redirect_uri),
                })
            });
            let mut app = app_with(api);
            signed_in(&mut app, View::Apps);
            settle(&mut app).await;

            press(&mut app, KeyCode::PageDown);
            fill(
                &mut app,
                &[
                    "Radio",
                    "https://radio.example.org/callback",
                    "https://radio.example.org",
                    "radio.example.org",
                ],
            );
            press(&mut app, KeyCode::Enter);
            settle(&mut app).await;

            match &app.state.dialog {
                Some(Dialog::AppSecret(created)) => {
                    assert_eq!(created.secret.as_deref(), Some("s3cr3t"))
                }
                other => panic!("expected secret dialog, got {other:?}"),
            }
            assert_eq!(app.state.apps.apps.len(), 1);
            assert_eq!(app.state.apps.apps[0].secret, None);
            press(&mut app, KeyCode::Esc);
            assert!(app.state.dialog.is_none());
        }

        #[tokio::test]
        async fn test_delete_requires_typed_name() {
            let mut api = MockAccountApi::new();
            api.expect_list_apps()
                .times(1)
                .returning(|| Ok(vec![listed()]));
            api.expect_delete_app()
                .times(1)
                .withf(|r| r.client_id == "player" && r.application_name == "Player")
                .returning(|_| Ok(ApiMessage::new("")));
            let mut app = app_with(api);
            signed_in(&mut app, View::Apps);
            settle(&mut app).await;

            press(&mut app, KeyCode::Char('d'));
            assert_eq!(app.state.dialog, Some(Dialog::DeleteApp));
            type_text(&mut app, "Playr");
            ctrl(&mut app, 's');
            assert!(!app.tasks.has_tasks(ComponentId::AppDelete));

            press(&mut app, KeyCode::Backspace);
            type_text(&mut app, "er");
            assert_eq!(
                app.state.apps.delete_form.as_ref().map(|f| f.value("application_name")),
                Some("Player")
            );
            ctrl(&mut app, 's');
            assert!(app.state.apps.delete_form.is_some());
            settle(&mut app).await;

            assert!(app.state.apps.apps.is_empty());
            assert!(app.state.dialog.is_none());
            assert_eq!(latest_toast(&app), Some("Player has been deleted"));
        }
    }

    mod profile_new {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_label_type_is_paused() {
            let mut api = MockAccountApi::new();
            api.expect_update_profile().times(0);
            let mut app = app_with(api);
            signed_in(&mut app, View::ProfileNew);

            press(&mut app, KeyCode::Up);
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.state.profile_new.step(), ProfileStep::ProfileType);
            assert!(latest_toast(&app).is_some_and(|m| m.contains("paused")));
        }

        #[tokio::test]
        async fn test_artist_type_puts_role_and_advances() {
            let mut api = MockAccountApi::new();
            api.expect_update_profile()
                .times(1)
                .withf(|u| u.role.as_deref() == Some("member"))
                .returning(|_| Ok(ApiMessage::new("")));
            let mut app = app_with(api);
            signed_in(&mut app, View::ProfileNew);

            press(&mut app, KeyCode::Down);
            press(&mut app, KeyCode::Enter);
            settle(&mut app).await;

            assert_eq!(app.state.profile_new.step(), ProfileStep::BasicInfo);
        }

        #[tokio::test]
        async fn test_small_image_is_rejected_before_upload() {
            let mut api = MockAccountApi::new();
            api.expect_upload_image().times(0);
            let mut app = app_with(api);
            signed_in(&mut app, View::ProfileNew);
            app.state.profile_new.steps.emit(StepEvent::Next);

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("tiny.png");
            std::fs::write(&path, fixtures::png(100, 50)).unwrap();

            app.state.profile_new.basic_info.focus("profilePicture");
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.state.dialog, Some(Dialog::ImageUpload));
            type_text(&mut app, &path.display().to_string());
            ctrl(&mut app, 's');
            settle(&mut app).await;

            let upload = app.state.profile_new.upload.as_ref().unwrap();
            assert_eq!(
                upload.form.status.as_ref().map(|s| s.text.as_str()),
                Some("Image size is too small")
            );
            assert!(!upload.form.is_loading());
        }

        #[tokio::test]
        async fn test_uploaded_filename_fills_basic_info() {
            const REF: &str = "1b4e28ba-2fa1-4d3b-a3f5-ef19b5a7633b";
            let mut api = MockAccountApi::new();
            api.expect_upload_image()
                .times(1)
                .withf(|u| u.mime == "image/png")
                .returning(|_| {
                    Ok(UploadedImage {
                        filename: REF.to_string(),
                    })
                });
            let mut app = app_with(api);
            signed_in(&mut app, View::ProfileNew);
            app.state.profile_new.steps.emit(StepEvent::Next);

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("avatar.png");
            std::fs::write(&path, fixtures::png(400, 400)).unwrap();

            app.state.profile_new.basic_info.focus("profilePicture");
            press(&mut app, KeyCode::Enter);
            type_text(&mut app, &path.display().to_string());
            ctrl(&mut app, 's');
            settle(&mut app).await;
            settle(&mut app).await;

            assert!(app.state.dialog.is_none());
            assert_eq!(app.state.profile_new.basic_info.value("profilePicture"), REF);
        }

        fn basic_info_ready(app: &mut App) {
            app.state.profile_new.steps.emit(StepEvent::Next);
            let form = &mut app.state.profile_new.basic_info;
            form.set_value("profilePicture", "1b4e28ba-2fa1-4d3b-a3f5-ef19b5a7633b");
            form.focus("name");
            type_text(app, "Ada Lovelace");
            app.state.profile_new.basic_info.focus("location");
            type_text(app, "Ghent");
        }

        #[tokio::test]
        async fn test_basic_info_saved_before_recap() {
            let mut api = MockAccountApi::new();
            api.expect_update_basic_info()
                .times(1)
                .withf(|i| i.nickname == "Ada Lovelace" && i.city == "Ghent" && i.bio.is_empty())
                .returning(|_| Ok(ApiMessage::new("Account updated")));
            let mut app = app_with(api);
            signed_in(&mut app, View::ProfileNew);
            basic_info_ready(&mut app);

            ctrl(&mut app, 's');
            assert_eq!(app.state.profile_new.step(), ProfileStep::BasicInfo);
            assert!(app.state.profile_new.basic_info.is_loading());

            settle(&mut app).await;
            assert_eq!(app.state.profile_new.step(), ProfileStep::Recap);
            assert_eq!(
                app.state.profile.as_ref().map(|p| p.display_name.as_str()),
                Some("Ada Lovelace")
            );
        }

        #[tokio::test]
        async fn test_basic_info_error_keeps_step() {
            let mut api = MockAccountApi::new();
            api.expect_update_basic_info().times(1).returning(|_| {
                Err(ApiError::Rejected {
                    status: 400,
                    message: "Nickname is taken".to_string(),
                })
            });
            let mut app = app_with(api);
            signed_in(&mut app, View::ProfileNew);
            basic_info_ready(&mut app);

            ctrl(&mut app, 's');
            settle(&mut app).await;

            let page = &app.state.profile_new;
            assert_eq!(page.step(), ProfileStep::BasicInfo);
            assert!(!page.basic_info.is_loading());
            assert_eq!(page.basic_info.value("name"), "Ada Lovelace");
            assert_eq!(latest_toast(&app), Some("Nickname is taken"));
        }

        #[tokio::test]
        async fn test_artist_member_added_from_recap() {
            let mut app = app_with(MockAccountApi::new());
            signed_in(&mut app, View::ProfileNew);
            let page = &mut app.state.profile_new;
            page.profile_type = crate::state::ProfileType::Artist;
            page.steps.emit(StepEvent::Next);
            page.steps.emit(StepEvent::Next);
            assert_eq!(page.step(), ProfileStep::Recap);

            press(&mut app, KeyCode::Char('m'));
            assert_eq!(app.state.dialog, Some(Dialog::ArtistMember));
            ctrl(&mut app, 's');
            let form = app.state.profile_new.member_form.as_ref().unwrap();
            assert_eq!(
                form.visible_error("role").map(|e| e.message.as_str()),
                Some("Role is required")
            );

            app.state.profile_new.member_form.as_mut().unwrap().focus("displayName");
            fill(&mut app, &["Jaco", "Bass Guitar"]);
            ctrl(&mut app, 's');

            assert!(app.state.dialog.is_none());
            assert_eq!(app.state.profile_new.members.len(), 1);
            assert_eq!(latest_toast(&app), Some("Jaco added as Bass Guitar"));
        }

        #[tokio::test]
        async fn test_listener_recap_has_no_members() {
            let mut app = app_with(MockAccountApi::new());
            signed_in(&mut app, View::ProfileNew);
            let page = &mut app.state.profile_new;
            page.steps.emit(StepEvent::Next);
            page.steps.emit(StepEvent::Next);

            press(&mut app, KeyCode::Char('m'));
            assert!(app.state.dialog.is_none());
        }
    }

    mod membership {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_saved_card_clears_form() {
            let mut api = MockAccountApi::new();
            api.expect_save_payment_method()
                .times(1)
                .withf(|c| c.cvc == "123")
                .returning(|_| Ok(ApiMessage::new("")));
            let mut app = app_with(api);
            signed_in(&mut app, View::Membership);

            fill(
                &mut app,
                &["Ada Lovelace", "4242 4242 4242 4242", "12/99", "123"],
            );
            press(&mut app, KeyCode::Enter);
            settle(&mut app).await;

            assert_eq!(app.state.membership.value("number"), "");
            assert_eq!(latest_toast(&app), Some("Your payment method has been saved"));
        }

        #[tokio::test]
        async fn test_server_error_shown_inline() {
            let mut api = MockAccountApi::new();
            api.expect_save_payment_method().times(1).returning(|_| {
                Err(ApiError::Rejected {
                    status: 402,
                    message: "Your card was declined".to_string(),
                })
            });
            let mut app = app_with(api);
            signed_in(&mut app, View::Membership);

            fill(
                &mut app,
                &["Ada Lovelace", "4242 4242 4242 4242", "12/99", "123"],
            );
            press(&mut app, KeyCode::Enter);
            settle(&mut app).await;

            let form = &app.state.membership;
            assert_eq!(
                form.status.as_ref().map(|s| s.text.as_str()),
                Some("Your card was declined")
            );
            assert_eq!(form.value("cvc"), "123");
        }
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/a.png"), PathBuf::from("/tmp/a.png"));
    }
}
