//! Signed-out screens and the OAuth consent screen

use super::forms::{draw_form_block, draw_help_text, form_height};
use super::form_column;
use crate::app::App;
use crate::state::{FormModel, ResetStage, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw one of the signed-out forms (login, join, password reset)
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let (form, help) = match app.state.current_view {
        View::Signup => (
            &app.state.signup,
            "Already have an account? Press F1 to log in.",
        ),
        View::PasswordReset => {
            let page = &app.state.password_reset;
            let help = match page.stage {
                ResetStage::Request => {
                    "We will e-mail you a reset token. Already have one? Press PgDn."
                }
                ResetStage::Update => "Paste the token from the reset e-mail. PgUp to request one.",
            };
            (page.focused_form(), help)
        }
        _ => (
            &app.state.login,
            "New here? Press F2 to join. Forgot your password? Press F3.",
        ),
    };
    draw_centered_form(frame, area, form, help);
}

fn draw_centered_form(frame: &mut Frame, area: Rect, form: &FormModel, help: &str) {
    let column = form_column(area, 60);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height(form) + 2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(column);
    draw_form_block(frame, chunks[0], form, true);
    draw_help_text(frame, chunks[1], help);
}

/// Allow/Deny screen for a third-party app asking for access
pub fn draw_authorize(frame: &mut Frame, area: Rect, app: &App) {
    let page = &app.state.authorize;
    let column = form_column(area, 60);
    let block = Block::default()
        .title(" Authorize ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(column);
    frame.render_widget(block, column);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(page.display_name(), bold.fg(Color::Cyan)),
            Span::raw(" wants to access your Resonate account."),
        ]),
        Line::from(""),
    ];

    for (allow, label, color) in [(true, "Allow", Color::Green), (false, "Deny", Color::Red)] {
        let selected = page.allow == allow;
        let (prefix, style) = if selected {
            ("▸ ", Style::default().fg(color).add_modifier(Modifier::BOLD))
        } else {
            ("  ", Style::default().fg(Color::DarkGray))
        };
        lines.push(Line::from(Span::styled(format!("{prefix}{label}"), style)));
    }

    lines.push(Line::from(""));
    if page.request.loader_visible() {
        lines.push(Line::from(Span::styled(
            "Waiting for the server ⋯",
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(redirect) = &page.redirect {
        lines.push(Line::from(Span::styled(
            "Continue in your browser:",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            redirect.location.as_str(),
            Style::default().fg(Color::Blue),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
