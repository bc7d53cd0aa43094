//! Account settings view

use super::forms::{draw_form_block, form_height};
use crate::app::App;
use crate::state::countries::COUNTRIES;
use crate::state::{AccountPage, AccountSection, FormModel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let page = &app.state.account;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(40)])
        .split(area);

    draw_sections(frame, chunks[0], page.section);

    let content = chunks[1];
    match page.section {
        AccountSection::Profile => {
            let confirmed = app.state.profile.as_ref().is_some_and(|p| p.email_confirmed);
            draw_profile(frame, content, &page.profile_form, confirmed)
        }
        AccountSection::Usergroups => {
            draw_usergroups(frame, content, page, app.state.active_usergroup.as_deref())
        }
        AccountSection::Password => draw_form_section(frame, content, &page.password_form),
        AccountSection::Location => draw_location(frame, content, page),
        AccountSection::Delete => draw_delete(frame, content, page),
    }
}

fn draw_form_section(frame: &mut Frame, area: Rect, form: &FormModel) {
    let height = (form_height(form) + 2).min(area.height);
    draw_form_block(frame, Rect { height, ..area }, form, true);
}

fn draw_profile(frame: &mut Frame, area: Rect, form: &FormModel, email_confirmed: bool) {
    let height = (form_height(form) + 2).min(area.height);
    draw_form_block(frame, Rect { height, ..area }, form, true);
    if email_confirmed || area.height <= height {
        return;
    }
    let note = Rect {
        y: area.y + height,
        height: 1,
        ..area
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            " E-mail not confirmed: check your inbox for the confirmation link.",
            Style::default().fg(Color::Yellow),
        )),
        note,
    );
}

/// Owned artist and label profiles; the active one is checked
fn draw_usergroups(frame: &mut Frame, area: Rect, page: &AccountPage, active: Option<&str>) {
    let block = Block::default()
        .title(" Profiles ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if page.usergroups.is_empty() {
        let text = "You have no artist or label profile yet. Press F3 to create one.";
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = page
        .usergroups
        .iter()
        .map(|group| {
            let marker = if active == Some(group.id.as_str()) {
                "✓ "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{}", group.display_name))
        })
        .collect();
    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default().with_selected(Some(page.usergroup_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_sections(frame: &mut Frame, area: Rect, current: AccountSection) {
    let lines: Vec<Line> = AccountSection::ALL
        .iter()
        .map(|section| {
            if *section == current {
                Line::from(Span::styled(
                    format!("▸ {}", section.title()),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {}", section.title()),
                    Style::default().fg(Color::Gray),
                ))
            }
        })
        .collect();
    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_location(frame: &mut Frame, area: Rect, page: &AccountPage) {
    let title = if page.location.loader_visible() {
        " Location ⋯ ".to_string()
    } else if page.country_changed() {
        " Location (Enter to save) ".to_string()
    } else {
        " Location ".to_string()
    };

    let items: Vec<ListItem> = COUNTRIES
        .iter()
        .enumerate()
        .map(|(index, (_, name))| {
            let marker = if page.saved_country == Some(index) {
                "✓ "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{name}"))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default().with_selected(Some(page.country_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_delete(frame: &mut Frame, area: Rect, page: &AccountPage) {
    let mut lines = vec![
        Line::from("Deleting your account removes your profiles and apps."),
        Line::from("The deletion happens 24 hours after you confirm; you can cancel it from the e-mail we send you."),
        Line::from(""),
    ];
    if page.deletion.loader_visible() {
        lines.push(Line::from(Span::styled(
            "Scheduling deletion ⋯",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::raw("Press "),
            Span::styled(
                "Enter",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" to delete your account."),
        ]));
    }
    let block = Block::default()
        .title(" Delete account ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}
