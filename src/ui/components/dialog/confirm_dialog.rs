//! Yes/no dialog for account-level actions

use super::base::{hint_spans, open_modal, wrap_text, Tone};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const WIDTH: u16 = 56;

/// What a yes/no dialog asks
pub struct ConfirmPrompt<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub confirm_label: &'a str,
    pub tone: Tone,
    /// Whether the confirm option is highlighted
    pub confirm: bool,
}

fn option_line<'a>(label: &'a str, selected: bool, color: Color) -> Line<'a> {
    if selected {
        Line::from(Span::styled(
            format!("▸ {label}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!("  {label}"),
            Style::default().fg(Color::DarkGray),
        ))
    }
}

pub fn render_confirm_dialog(frame: &mut Frame, prompt: &ConfirmPrompt) {
    let mut lines = vec![
        Line::from(Span::styled(prompt.title, prompt.tone.title_style())),
        Line::from(""),
    ];
    lines.extend(
        wrap_text(prompt.message, (WIDTH - 6) as usize)
            .into_iter()
            .map(Line::from),
    );
    lines.push(Line::from(""));
    lines.push(option_line("Cancel", !prompt.confirm, Color::White));
    lines.push(option_line(
        prompt.confirm_label,
        prompt.confirm,
        prompt.tone.color(),
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(hint_spans(&[
        ("↑↓", "select"),
        ("Enter", "confirm"),
        ("y/n", "answer"),
        ("Esc", "cancel"),
    ])));

    let mut inner = open_modal(frame, prompt.tone, WIDTH, lines.len() as u16 + 2);
    inner.x += 1;
    inner.width = inner.width.saturating_sub(2);
    frame.render_widget(
        Paragraph::new(lines).style(Style::new().bg(Color::Black).fg(Color::White)),
        inner,
    );
}
