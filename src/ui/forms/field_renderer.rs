//! Field rendering utilities for forms

use crate::form::{rules, FieldError};
use crate::state::{FieldKind, FormField};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows taken by a field's input box
pub fn field_box_height(field: &FormField) -> u16 {
    if field.is_multiline() {
        6
    } else {
        3
    }
}

/// Focus and validation state a field is drawn with
#[derive(Debug, Clone, Copy)]
pub struct FieldLook {
    pub is_active: bool,
    pub has_error: bool,
    pub required: bool,
}

/// Title of a field's box; required fields are starred
fn field_label(field: &FormField, look: FieldLook) -> String {
    let star = if look.required { " *" } else { "" };
    if field.kind == FieldKind::Upload && look.is_active {
        format!(" {}{star} (Enter to upload) ", field.label)
    } else {
        format!(" {}{star} ", field.label)
    }
}

/// Draw a form field using FormField from the domain layer
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, look: FieldLook) {
    let FieldLook {
        is_active,
        has_error,
        ..
    } = look;
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };

    let border_style = match (is_active, has_error) {
        (_, true) => Style::default().fg(Color::Red),
        (true, false) => Style::default().fg(Color::Cyan),
        (false, false) => Style::default().fg(Color::DarkGray),
    };

    let display_value = field.display_value();
    let placeholder = if display_value.is_empty() {
        match (field.placeholder, is_active) {
            (Some(text), _) => Some(text),
            (None, false) => Some("(empty)"),
            (None, true) => None,
        }
    } else {
        None
    };

    // Upload and toggle fields are never typed into
    let cursor = if is_active && field.accepts_typing() {
        "▌"
    } else {
        ""
    };
    let cursor_span = Span::styled(cursor, Style::default().fg(Color::Cyan));

    let content = if let Some(text) = placeholder {
        Paragraph::new(Line::from(vec![
            cursor_span,
            Span::styled(
                text,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]))
    } else if field.is_multiline() {
        let mut lines: Vec<Line> = display_value
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), style)))
            .collect();
        if let Some(last) = lines.last_mut() {
            last.spans.push(cursor_span);
        }
        Paragraph::new(lines)
    } else {
        Paragraph::new(Line::from(vec![
            Span::styled(display_value, style),
            cursor_span,
        ]))
    };

    let block = Block::default()
        .title(field_label(field, look))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

/// One-line message under a field
pub fn draw_field_error(frame: &mut Frame, area: Rect, error: &FieldError) {
    let line = Line::from(Span::styled(
        format!(" {}", error.message),
        Style::default().fg(Color::Red),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Strength bar shown under new-password fields
pub fn draw_strength_meter(frame: &mut Frame, area: Rect, password: &str) {
    if password.is_empty() {
        return;
    }
    let score = rules::password_strength(password);
    let (label, color) = match score {
        0 | 1 => ("weak", Color::Red),
        2 => ("fair", Color::Yellow),
        3 => ("good", Color::Green),
        _ => ("strong", Color::LightGreen),
    };
    let filled = usize::from(score.max(1));
    let line = Line::from(vec![
        Span::styled(" Strength ", Style::default().fg(Color::DarkGray)),
        Span::styled("■".repeat(filled), Style::default().fg(color)),
        Span::styled(
            "□".repeat(4 - filled),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!(" {label}"), Style::default().fg(color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw help text at the bottom of a view
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}
