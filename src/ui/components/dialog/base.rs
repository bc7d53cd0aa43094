//! Shared modal plumbing: placement, framing and text wrapping

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Horizontal space taken by borders plus one column of padding per side
const CHROME: u16 = 4;

/// Accent of a modal, applied to its border and title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Danger,
    Warning,
    Success,
    Neutral,
}

impl Tone {
    pub fn color(self) -> Color {
        match self {
            Tone::Danger => Color::Red,
            Tone::Warning => Color::Yellow,
            Tone::Success => Color::Green,
            Tone::Neutral => Color::Cyan,
        }
    }

    pub fn title_style(self) -> Style {
        Style::default()
            .fg(self.color())
            .add_modifier(Modifier::BOLD)
    }
}

/// A text modal: title, wrapped message, optional extra lines and a key
/// hint row
pub struct Modal<'a> {
    pub title: &'a str,
    pub tone: Tone,
    pub message: &'a str,
    pub extra: Vec<Line<'a>>,
    pub keys: &'a [(&'a str, &'a str)],
    pub max_width: u16,
}

/// Rect of `width` x `height` centered in `area`, clamped to it
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Clear a centered `width` x `height` region, draw the modal border in
/// `tone` and return the area inside it
pub fn open_modal(frame: &mut Frame, tone: Tone, width: u16, height: u16) -> Rect {
    let area = centered_rect(frame.area(), width, height);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tone.color()))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Key hint spans: key in cyan, description in gray
pub fn hint_spans<'a>(pairs: &[(&'a str, &'a str)]) -> Vec<Span<'a>> {
    pairs
        .iter()
        .flat_map(|&(key, description)| {
            [
                Span::styled(key, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!(" {description}  "),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect()
}

pub fn render_modal(frame: &mut Frame, modal: Modal) {
    let text_width = modal.max_width.saturating_sub(CHROME);
    let message = wrap_text(modal.message, text_width as usize);

    let widest = message
        .iter()
        .map(|l| l.chars().count())
        .chain(modal.extra.iter().map(Line::width))
        .chain(std::iter::once(modal.title.chars().count()))
        .max()
        .unwrap_or(0) as u16;
    let width = (widest + CHROME).min(modal.max_width);

    let mut lines = vec![
        Line::from(Span::styled(modal.title, modal.tone.title_style())),
        Line::from(""),
    ];
    lines.extend(message.into_iter().map(Line::from));
    lines.extend(modal.extra);
    if !modal.keys.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(hint_spans(modal.keys)));
    }

    let height = lines.len() as u16 + 2;
    let inner = open_modal(frame, modal.tone, width, height);
    let inner = Rect {
        x: inner.x + 1,
        width: inner.width.saturating_sub(2),
        ..inner
    };
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(Color::Black).fg(Color::White)),
        inner,
    );
}

/// Greedy word wrap on character counts. Blank input lines are kept;
/// a word longer than `max_width` sits alone on its line.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let used = line.chars().count();
            if used > 0 && used + 1 + word.chars().count() > max_width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}
