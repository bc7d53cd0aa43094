//! Bordered buttons: sidebar menu entries and form submit buttons

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by a button including its border
pub const BUTTON_HEIGHT: u16 = 3;

/// Visual state of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLook {
    Idle,
    Focused,
    /// Form is unchanged or already submitted
    Disabled,
    /// Request in flight and the loader is showing
    Busy,
}

impl ButtonLook {
    pub fn for_submit(focused: bool, enabled: bool, loading: bool) -> Self {
        match (loading, enabled, focused) {
            (true, _, _) => ButtonLook::Busy,
            (false, false, _) => ButtonLook::Disabled,
            (false, true, true) => ButtonLook::Focused,
            (false, true, false) => ButtonLook::Idle,
        }
    }

    fn border(self) -> Style {
        match self {
            ButtonLook::Focused => Style::default().fg(Color::Cyan),
            ButtonLook::Busy => Style::default().fg(Color::Yellow),
            ButtonLook::Idle | ButtonLook::Disabled => Style::default().fg(Color::DarkGray),
        }
    }

    fn label(self) -> Style {
        match self {
            ButtonLook::Idle => Style::default(),
            ButtonLook::Focused => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            ButtonLook::Disabled => Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
            ButtonLook::Busy => Style::default().fg(Color::Yellow),
        }
    }
}

pub fn render_button(frame: &mut Frame, area: Rect, line: Line, look: ButtonLook) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(look.border());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Menu entry in the sidebar: the function key dimmed, the view name lit
/// when it is the current view
pub fn render_sidebar_button(
    frame: &mut Frame,
    area: Rect,
    key: &str,
    label: &str,
    is_selected: bool,
) {
    let look = if is_selected {
        ButtonLook::Focused
    } else {
        ButtonLook::Idle
    };
    let line = Line::from(vec![
        Span::styled(format!(" {key} "), Style::default().fg(Color::DarkGray)),
        Span::styled(label.to_string(), look.label()),
    ]);
    render_button(frame, area, line, look);
}

pub fn render_submit_button(frame: &mut Frame, area: Rect, label: &str, look: ButtonLook) {
    let text = match look {
        ButtonLook::Busy => format!("{label} ⋯"),
        _ => label.to_string(),
    };
    let line = Line::from(Span::styled(text, look.label())).alignment(Alignment::Center);
    render_button(frame, area, line, look);
}
