//! New profile onboarding: profile type, basic info, recap

use super::forms::{draw_form_block, form_height};
use crate::app::App;
use crate::state::{FormModel, ProfileNewPage, ProfileStep, ProfileType};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const STEPS: [(ProfileStep, &str); 3] = [
    (ProfileStep::ProfileType, "Profile type"),
    (ProfileStep::BasicInfo, "Basic info"),
    (ProfileStep::Recap, "Recap"),
];

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let page = &app.state.profile_new;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    draw_progress(frame, chunks[0], page.step());

    let body = chunks[1];
    match page.step() {
        ProfileStep::ProfileType => draw_types(frame, body, page),
        ProfileStep::BasicInfo => {
            let form = &page.basic_info;
            let height = (form_height(form) + 2).min(body.height);
            draw_form_block(frame, Rect { height, ..body }, form, app.state.dialog.is_none());
        }
        ProfileStep::Recap => draw_recap(frame, body, page),
    }
}

/// `1 Profile type › 2 Basic info › 3 Recap` with the current step lit
fn draw_progress(frame: &mut Frame, area: Rect, current: ProfileStep) {
    let mut spans = Vec::new();
    for (index, (step, label)) in STEPS.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
        }
        let style = if *step == current {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("{} {label}", index + 1), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_types(frame: &mut Frame, area: Rect, page: &ProfileNewPage) {
    let mut lines = Vec::new();
    for kind in ProfileType::ALL {
        let selected = kind == page.profile_type;
        let prefix = if selected { "▸ " } else { "  " };
        let mut title = Style::default().add_modifier(Modifier::BOLD);
        if selected {
            title = title.fg(Color::Cyan);
        }
        let mut spans = vec![Span::styled(format!("{prefix}{}", kind.label()), title)];
        if kind.is_paused() {
            spans.push(Span::styled(
                "  (paused)",
                Style::default().fg(Color::Yellow),
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(Span::styled(
            format!("    {}", kind.description()),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }
    if page.type_request.loader_visible() {
        lines.push(Line::from(Span::styled(
            "Saving ⋯",
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Block::default()
        .title(" Choose a profile type ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn recap_line<'a>(label: &'a str, value: &'a str) -> Line<'a> {
    let value = if value.is_empty() { "-" } else { value };
    Line::from(vec![
        Span::styled(format!("{label:<18}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn draw_recap(frame: &mut Frame, area: Rect, page: &ProfileNewPage) {
    let form: &FormModel = &page.basic_info;
    let subscribed = if form.value("subscription") == "on" {
        "yes"
    } else {
        "no"
    };
    let mut lines = vec![
        recap_line("Profile type", page.profile_type.label()),
        recap_line("Name", form.value("name")),
        recap_line("Bio", form.value("bio")),
        recap_line("Location", form.value("location")),
        recap_line("Newsletter", subscribed),
        recap_line("Profile picture", form.value("profilePicture")),
        recap_line("Header image", form.value("headerImage")),
    ];
    if page.profile_type == ProfileType::Artist {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Members",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if page.members.is_empty() {
            lines.push(Line::from(Span::styled(
                "  none yet, press m to add one",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for member in &page.members {
            lines.push(Line::from(vec![
                Span::raw(format!("  {}", member.display_name)),
                Span::styled(
                    format!("  {}", member.role),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to finish or Esc to go back.",
        Style::default().fg(Color::Gray),
    )));
    let block = Block::default()
        .title(" Recap ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}
