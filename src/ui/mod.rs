//! UI module for rendering the TUI

mod account;
mod apps;
mod components;
mod forms;
mod layout;
mod profile;
mod session;

use crate::app::App;
use crate::state::{Dialog, View};
use components::{
    render_app_secret_dialog, render_confirm_dialog, render_error_dialog, render_form_dialog,
    ConfirmPrompt, Tone,
};
use forms::{draw_form_block, form_height};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Draw the main layout with sidebar
    let (sidebar_area, main_area) = layout::create_layout(area);
    layout::draw_sidebar(frame, sidebar_area, app);

    // Draw main content based on current view
    match app.state.current_view {
        View::Login | View::Signup | View::PasswordReset => session::draw(frame, main_area, app),
        View::Authorize => session::draw_authorize(frame, main_area, app),
        View::Account => account::draw(frame, main_area, app),
        View::Apps => apps::draw(frame, main_area, app),
        View::ProfileNew => profile::draw(frame, main_area, app),
        View::Membership => {
            let form = &app.state.membership;
            let column = form_column(main_area, 60);
            let height = (form_height(form) + 2).min(column.height);
            draw_form_block(frame, Rect { height, ..column }, form, true);
        }
    }

    if let Some(dialog) = &app.state.dialog {
        draw_dialog(frame, app, dialog);
    }

    layout::draw_notifications(frame, main_area, app);

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Errors are modal and sit above everything else
    if let Some(error) = app.state.current_error() {
        render_error_dialog(frame, error);
    }
}

fn draw_dialog(frame: &mut Frame, app: &App, dialog: &Dialog) {
    match dialog {
        Dialog::DeleteAccount { confirm } => render_confirm_dialog(
            frame,
            &ConfirmPrompt {
                title: "Delete account",
                message: "Are you sure you want to delete your account? \
                          It will be deleted in 24 hours.",
                confirm_label: "Delete",
                tone: Tone::Danger,
                confirm: *confirm,
            },
        ),
        Dialog::LogoutPrompt { confirm } => render_confirm_dialog(
            frame,
            &ConfirmPrompt {
                title: "Password changed",
                message: "Do you want to log out now?",
                confirm_label: "Log out",
                tone: Tone::Warning,
                confirm: *confirm,
            },
        ),
        Dialog::AppSecret(registered) => {
            render_app_secret_dialog(frame, registered, app.copy_message.as_deref())
        }
        Dialog::DeleteApp => {
            if let (Some(form), Some(target)) =
                (&app.state.apps.delete_form, &app.state.apps.delete_target)
            {
                let message = format!(
                    "Type \"{}\" to delete this app. Clients using it will stop working.",
                    target.application_name
                );
                render_form_dialog(frame, form, Some(&message), Tone::Danger);
            }
        }
        Dialog::ImageUpload => {
            if let Some(upload) = &app.state.profile_new.upload {
                let (width, height) = upload.target.min_dimensions();
                let message = format!(
                    "{}: JPEG or PNG, at least {width}x{height} pixels, at most 10 MiB.",
                    upload.target.label()
                );
                render_form_dialog(frame, &upload.form, Some(&message), Tone::Neutral);
            }
        }
        Dialog::ArtistMember => {
            if let Some(form) = &app.state.profile_new.member_form {
                render_form_dialog(frame, form, None, Tone::Neutral);
            }
        }
    }
}

/// Centered column of at most `max_width` cells
fn form_column(area: Rect, max_width: u16) -> Rect {
    let width = max_width.min(area.width);
    let side = (area.width - width) / 2;
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(side),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(area)[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAccountApi;
    use crate::config::PortalConfig;
    use crate::state::{
        AccountSection, Profile, ProfileType, RegisteredApp, StepEvent, Usergroup,
    };
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 48)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        App::new(PortalConfig::default(), Arc::new(MockAccountApi::new()))
    }

    #[tokio::test]
    async fn test_login_screen_shows_form_and_menu() {
        let screen = render(&app());
        assert!(screen.contains("Log in"));
        assert!(screen.contains("E-mail"));
        assert!(screen.contains("F2 Join"));
    }

    #[tokio::test]
    async fn test_submit_errors_are_rendered() {
        let mut app = app();
        app.state.login.submit(std::time::Instant::now());
        let screen = render(&app);
        assert!(screen.contains("Email is required"));
        assert!(screen.contains("Password is required"));
    }

    #[tokio::test]
    async fn test_app_secret_dialog() {
        let mut app = app();
        app.state.profile = Some(Profile::default());
        app.state.current_view = View::Apps;
        app.state.dialog = Some(Dialog::AppSecret(RegisteredApp {
            client_id: "abc".to_string(),
            secret: Some("s3cr3t".to_string()),
            application_name: "Player".to_string(),
            ..RegisteredApp::default()
        }));
        let screen = render(&app);
        assert!(screen.contains("s3cr3t"));
        assert!(screen.contains("will not be shown again"));
    }

    #[tokio::test]
    async fn test_usergroups_section_marks_active() {
        let mut app = app();
        let profile = Profile {
            usergroups: vec![Usergroup {
                id: "ug-1".to_string(),
                display_name: "The Engines".to_string(),
                ..Usergroup::default()
            }],
            ..Profile::default()
        };
        app.state.account.load_profile(&profile);
        app.state.profile = Some(profile);
        app.state.active_usergroup = Some("ug-1".to_string());
        app.state.current_view = View::Account;
        app.state.account.section = AccountSection::Usergroups;
        let screen = render(&app);
        assert!(screen.contains("✓ The Engines"));
        assert!(screen.contains("E-mail not confirmed"));
    }

    #[tokio::test]
    async fn test_password_reset_token_stage() {
        let mut app = app();
        app.state.current_view = View::PasswordReset;
        app.state.password_reset.toggle_stage();
        let screen = render(&app);
        assert!(screen.contains("Reset token *"));
        assert!(screen.contains("Choose a new password"));
    }

    #[tokio::test]
    async fn test_artist_recap_lists_members() {
        let mut app = app();
        app.state.profile = Some(Profile::default());
        app.state.current_view = View::ProfileNew;
        let page = &mut app.state.profile_new;
        page.profile_type = ProfileType::Artist;
        page.steps.emit(StepEvent::Next);
        page.steps.emit(StepEvent::Next);
        assert!(page.open_member());
        if let Some(form) = page.member_form.as_mut() {
            form.set_value("displayName", "Kim");
            form.set_value("role", "Bass Guitar");
        }
        assert!(page.add_member().is_some());
        let screen = render(&app);
        assert!(screen.contains("Members"));
        assert!(screen.contains("Kim  Bass Guitar"));
        assert!(screen.contains("m:add member"));
    }

    #[tokio::test]
    async fn test_error_dialog_on_top() {
        let mut app = app();
        app.push_error("Could not copy the secret");
        let screen = render(&app);
        assert!(screen.contains("Could not copy the secret"));
    }
}
