use super::theme::Palette;
use crate::app::{App, InputMode, Theme};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const NAV_ITEMS: [&str; 3] = ["Home", "Movies", "TV Shows"];
const SEARCH_WIDTH: u16 = 36;

pub fn render(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(20),
            Constraint::Length(SEARCH_WIDTH),
            Constraint::Length(6),
        ])
        .split(area);

    // ── Brand + placeholder nav ──
    let mut spans = vec![
        Span::styled(
            " StreamFlix ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    for (i, item) in NAV_ITEMS.iter().enumerate() {
        let style = if i == 0 {
            Style::default().fg(palette.fg)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(*item, style));
        spans.push(Span::raw("   "));
    }
    let brand = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border)),
    );
    frame.render_widget(brand, chunks[0]);

    // ── Search box ──
    let editing = app.input_mode == InputMode::Editing;
    let search_style = if editing {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.border)
    };
    let text = if app.search.is_empty() && !editing {
        Span::styled("Search movies... (/)", Style::default().fg(palette.muted))
    } else {
        Span::styled(app.search.as_str(), Style::default().fg(palette.fg))
    };
    let search = Paragraph::new(Line::from(vec![Span::raw(" 🔍 "), text])).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style),
    );
    frame.render_widget(search, chunks[1]);

    if editing {
        let typed = unicode_width::UnicodeWidthStr::width(app.search.as_str()) as u16;
        // border(1) + " 🔍 " (4 columns)
        let cursor_x = (chunks[1].x + 5 + typed).min(chunks[1].right().saturating_sub(2));
        frame.set_cursor_position((cursor_x, chunks[1].y + 1));
    }

    // ── Theme toggle ──
    let icon = match app.theme {
        Theme::Dark => "☀ t",
        Theme::Light => "☾ t",
    };
    let toggle = Paragraph::new(Span::styled(icon, Style::default().fg(palette.muted))).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border)),
    );
    frame.render_widget(toggle, chunks[2]);
}
