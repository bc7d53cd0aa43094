//! One-time display of a newly registered app's credentials

use super::base::{render_modal, Modal, Tone};
use crate::state::RegisteredApp;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};

pub fn render_app_secret_dialog(frame: &mut Frame, app: &RegisteredApp, copy_message: Option<&str>) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut extra = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Client ID      ", label),
            Span::styled(app.client_id.as_str(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Client secret  ", label),
            Span::styled(app.secret.as_deref().unwrap_or("(none)"), value),
        ]),
    ];
    if let Some(message) = copy_message {
        extra.push(Line::from(Span::styled(
            message,
            Style::default().fg(Color::Green),
        )));
    }

    render_modal(
        frame,
        Modal {
            title: &app.application_name,
            tone: Tone::Success,
            message: "Store the client secret now. It will not be shown again.",
            extra,
            keys: &[("c", "copy secret"), ("Enter", "close")],
            max_width: 72,
        },
    );
}
