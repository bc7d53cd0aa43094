//! A form mounted in a centered overlay

use super::base::{open_modal, wrap_text, Tone};
use crate::state::FormModel;
use crate::ui::forms::{draw_form, form_height};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

const WIDTH: u16 = 64;

/// Render `form` over the current view, with an optional explanation above
/// its fields
pub fn render_form_dialog(frame: &mut Frame, form: &FormModel, message: Option<&str>, tone: Tone) {
    let message_lines = message
        .map(|m| wrap_text(m, (WIDTH - 4) as usize))
        .unwrap_or_default();
    let message_height = message_lines.len() as u16;
    let inner = open_modal(frame, tone, WIDTH, form_height(form) + message_height + 2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(message_height), Constraint::Min(0)])
        .split(inner);

    let text: Vec<Line> = message_lines.into_iter().map(Line::from).collect();
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::White)),
        chunks[0],
    );
    draw_form(frame, chunks[1], form, true);
}
