//! Registered OAuth apps: list on the left, registration form on the right

use super::forms::{draw_form_block, form_height};
use crate::app::App;
use crate::state::{AppsFocus, AppsPage};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let page = &app.state.apps;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    draw_list(frame, chunks[0], page);

    let form = &page.register_form;
    let form_area = Rect {
        height: (form_height(form) + 2).min(chunks[1].height),
        ..chunks[1]
    };
    draw_form_block(frame, form_area, form, page.focus == AppsFocus::Register);
}

fn draw_list(frame: &mut Frame, area: Rect, page: &AppsPage) {
    let focused = page.focus == AppsFocus::List;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let title = if page.list.loader_visible() {
        " Your apps ⋯ ".to_string()
    } else {
        format!(" Your apps ({}) ", page.apps.len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if page.apps.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No apps registered yet. Press PgDn to register one.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = page
        .apps
        .iter()
        .map(|app| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    app.application_name.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {}", app.application_url),
                    Style::default().fg(Color::Blue),
                )),
                Line::from(Span::styled(
                    format!("  client id {}", app.client_id),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let highlight = if focused {
        Style::default().bg(Color::DarkGray).fg(Color::Cyan)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight)
        .highlight_symbol("▸ ");
    let mut state = ListState::default().with_selected(Some(page.selected));
    frame.render_stateful_widget(list, area, &mut state);
}
