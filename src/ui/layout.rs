//! Layout components (sidebar, status bar, notifications)

use super::components::{render_sidebar_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::platform::{LOGOUT_SHORTCUT, SUBMIT_SHORTCUT};
use crate::state::{
    AccountSection, AppsFocus, Dialog, FieldKind, NotificationKind, ProfileStep, ProfileType,
    View,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;
const TOAST_WIDTH: u16 = 48;

/// Create the main layout with sidebar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    // Reserve bottom line for status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDEBAR_WIDTH), // Sidebar
            Constraint::Min(0),                // Main content
        ])
        .split(rows[0]);

    (chunks[0], chunks[1])
}

/// Draw the sidebar: header, then one boxed button per reachable view
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let menu = View::menu(app.state.is_signed_in());

    let mut constraints = vec![Constraint::Length(3)]; // Header
    constraints.extend(menu.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let who = app.state.persona_name().unwrap_or(if app.state.is_signed_in() {
        "signed in"
    } else {
        "not signed in"
    });
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" id.{}", app.config.app_domain()),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" {who}"),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(header, chunks[0]);

    for (idx, view) in menu.iter().enumerate() {
        render_sidebar_button(
            frame,
            chunks[idx + 1],
            &format!("F{}", idx + 1),
            view.title(),
            *view == app.state.current_view,
        );
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    // Session status
    let session = if app.state.is_signed_in() {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ ", Style::default().fg(Color::Red))
    };
    spans.push(session);

    // View-specific hints
    spans.push(Span::styled(
        get_view_hints(app),
        Style::default().fg(Color::Gray),
    ));
    if let Some(hint) = field_hint(app) {
        spans.push(Span::styled(
            format!("  {hint}"),
            Style::default().fg(Color::Cyan),
        ));
    }

    if app.state.is_signed_in() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(LOGOUT_SHORTCUT, Style::default().fg(Color::Gray)));
    }

    // Copy message
    if let Some(msg) = &app.copy_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let quit_hint = " ^C:quit ";

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    // Render quit hint on the right
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Stack live notifications in the top-right corner of `area`
pub fn draw_notifications(frame: &mut Frame, area: Rect, app: &App) {
    let width = TOAST_WIDTH.min(area.width);
    let mut y = area.y;
    for toast in app.notifier.visible() {
        let color = match toast.kind {
            NotificationKind::Info => Color::Green,
            NotificationKind::Error => Color::Red,
        };
        let inner_width = width.saturating_sub(2).max(1) as usize;
        let lines = (toast.message.chars().count() / inner_width) as u16 + 1;
        let height = lines + 2;
        if y + height > area.y + area.height {
            break;
        }
        let toast_area = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height,
        };
        frame.render_widget(Clear, toast_area);
        let widget = Paragraph::new(toast.message.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .style(Style::default().bg(Color::Black)),
            );
        frame.render_widget(widget, toast_area);
        y += height;
    }
}

const FORM_HINT: &str = "Tab/↑↓:field  Enter:next";

/// Get keyboard hints for the current view
/// Extra key for the focused field when it does not take plain typing
fn field_hint(app: &App) -> Option<&'static str> {
    let form = app.state.active_form()?;
    let field = form.fields.get(form.active_field_index)?;
    match field.kind {
        FieldKind::Multiline => Some("Enter:new line"),
        FieldKind::Toggle => Some("Space:toggle"),
        FieldKind::Upload => Some("Enter:choose image"),
        FieldKind::Text | FieldKind::Secret => None,
    }
}

fn get_view_hints(app: &App) -> String {
    let state = &app.state;
    match &state.dialog {
        Some(Dialog::DeleteApp) | Some(Dialog::ImageUpload) | Some(Dialog::ArtistMember) => {
            return format!("{FORM_HINT}  {SUBMIT_SHORTCUT}  Esc:cancel")
        }
        Some(Dialog::AppSecret(_)) => return "c:copy secret  Enter:close".to_string(),
        Some(_) => return "↑↓:select  y/n  Enter:confirm  Esc:cancel".to_string(),
        None => {}
    }
    match state.current_view {
        View::Login => format!("{FORM_HINT}  {SUBMIT_SHORTCUT}  F2:join  F3:reset password"),
        View::Signup => format!("{FORM_HINT}  {SUBMIT_SHORTCUT}  Esc:back"),
        View::PasswordReset => {
            format!("PgUp/PgDn:request/token  {FORM_HINT}  {SUBMIT_SHORTCUT}  Esc:back")
        }
        View::Authorize => "←→:allow/deny  Enter:confirm  Esc:back".to_string(),
        View::Account => match state.account.section {
            AccountSection::Location => {
                "PgUp/PgDn:section  ↑↓:country  a-z:jump  Enter:save".to_string()
            }
            AccountSection::Usergroups => "PgUp/PgDn:section  ↑↓:profile  Enter:switch".to_string(),
            AccountSection::Delete => "PgUp/PgDn:section  Enter:delete account".to_string(),
            _ => format!("PgUp/PgDn:section  {FORM_HINT}  {SUBMIT_SHORTCUT}"),
        },
        View::Apps => match state.apps.focus {
            AppsFocus::List => "PgDn:register  ↑↓:select  d:delete  r:reload".to_string(),
            AppsFocus::Register => format!("PgUp:list  {FORM_HINT}  {SUBMIT_SHORTCUT}"),
        },
        View::ProfileNew => match state.profile_new.step() {
            ProfileStep::ProfileType => "↑↓:type  Enter:continue".to_string(),
            ProfileStep::BasicInfo => format!("{FORM_HINT}  {SUBMIT_SHORTCUT}  Esc:back"),
            ProfileStep::Recap if state.profile_new.profile_type == ProfileType::Artist => {
                "m:add member  Enter:finish  Esc:back".to_string()
            }
            ProfileStep::Recap => "Enter:finish  Esc:back".to_string(),
        },
        View::Membership => format!("{FORM_HINT}  {SUBMIT_SHORTCUT}"),
    }
}
