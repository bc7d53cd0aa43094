//! Form rendering module
//!
//! Every screen form goes through `draw_form`: one box per field, a
//! message line under each (validation error or password meter), the
//! inline status and the submit button.

mod field_renderer;

pub use field_renderer::draw_help_text;

use crate::state::{FormKind, FormModel, NotificationKind};
use crate::ui::components::{render_submit_button, ButtonLook, BUTTON_HEIGHT};
use field_renderer::{
    draw_field, draw_field_error, draw_strength_meter, field_box_height, FieldLook,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Whether `name` on `kind` gets the strength meter
fn shows_strength(kind: FormKind, name: &str) -> bool {
    matches!(
        (kind, name),
        (FormKind::Signup, "password")
            | (FormKind::PasswordChange, "password_new")
            | (FormKind::PasswordResetUpdate, "password_new")
    )
}

/// Rows needed to draw `form` without its outer block
pub fn form_height(form: &FormModel) -> u16 {
    let fields: u16 = form.fields.iter().map(|f| field_box_height(f) + 1).sum();
    fields + 1 + BUTTON_HEIGHT
}

/// Draw a form inside a titled block
pub fn draw_form_block(frame: &mut Frame, area: Rect, form: &FormModel, focused: bool) {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .title(format!(" {} ", form.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    draw_form(frame, inner, form, focused);
}

/// Draw the fields, messages, status line and submit button of `form`
pub fn draw_form(frame: &mut Frame, area: Rect, form: &FormModel, focused: bool) {
    let mut constraints: Vec<Constraint> = form
        .fields
        .iter()
        .flat_map(|f| [Constraint::Length(field_box_height(f)), Constraint::Length(1)])
        .collect();
    constraints.push(Constraint::Length(1)); // status
    constraints.push(Constraint::Length(BUTTON_HEIGHT));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (index, field) in form.fields.iter().enumerate() {
        let is_active = focused && form.active_field_index == index;
        let error = form.visible_error(&field.name);
        let look = FieldLook {
            is_active,
            has_error: error.is_some(),
            required: form.is_required(&field.name),
        };
        draw_field(frame, chunks[index * 2], field, look);

        let message_area = chunks[index * 2 + 1];
        if let Some(error) = error {
            draw_field_error(frame, message_area, error);
        } else if shows_strength(form.kind, &field.name) {
            draw_strength_meter(frame, message_area, field.as_text());
        }
    }

    let status_index = form.fields.len() * 2;
    if let Some(status) = &form.status {
        let color = match status.kind {
            NotificationKind::Error => Color::Red,
            NotificationKind::Info => Color::Green,
        };
        let line = Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color),
        ));
        frame.render_widget(Paragraph::new(line), chunks[status_index]);
    }

    let button_area = chunks[status_index + 1];
    let button_area = Rect {
        width: button_area.width.min(form.button_text.chars().count() as u16 + 8),
        ..button_area
    };
    let look = ButtonLook::for_submit(
        focused && form.is_button_active(),
        !form.button_disabled(),
        form.machines.loader_visible(),
    );
    render_submit_button(frame, button_area, &form.button_text, look);
}
