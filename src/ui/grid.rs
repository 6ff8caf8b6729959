use super::theme::Palette;
use crate::catalog::MovieRecord;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const CARD_WIDTH: u16 = 28;
pub const CARD_HEIGHT: u16 = 7;

pub const EMPTY_TITLE: &str = "No movies found";
pub const EMPTY_HINT: &str = "Try adjusting your search terms";

/// How many cards fit side by side in `width` columns.
pub fn columns_for_width(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

/// Render the visible movies as cards, or the empty state.
pub fn render(frame: &mut Frame, area: Rect, movies: &[&MovieRecord], selected: usize, palette: &Palette) {
    if movies.is_empty() {
        render_empty(frame, area, palette);
        return;
    }

    let columns = columns_for_width(area.width);
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (r, row_area) in row_areas.iter().enumerate() {
        let row = first_row + r;
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(CARD_WIDTH); columns])
            .split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            let index = row * columns + c;
            let Some(movie) = movies.get(index) else {
                return;
            };
            render_card(frame, *cell, movie, index == selected, palette);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, movie: &MovieRecord, selected: bool, palette: &Palette) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let (border_style, border_type) = if selected {
        (Style::default().fg(palette.selected_border), BorderType::Thick)
    } else {
        (Style::default().fg(palette.border), BorderType::Rounded)
    };

    let mut lines = vec![Line::from(Span::styled(
        truncate_str(&movie.title, inner_width),
        Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
    ))];
    lines.push(match &movie.genre {
        Some(genre) => Line::from(Span::styled(
            truncate_str(genre, inner_width),
            Style::default().fg(palette.muted),
        )),
        None => Line::from(""),
    });
    lines.push(match &movie.duration_label {
        Some(duration) => Line::from(Span::styled(
            truncate_str(&format!("⏱ {}", duration), inner_width),
            Style::default().fg(palette.muted),
        )),
        None => Line::from(""),
    });
    lines.push(Line::from(Span::styled(
        truncate_str(&movie.poster_url, inner_width),
        Style::default().fg(palette.border).add_modifier(Modifier::ITALIC),
    )));
    if selected {
        lines.push(Line::from(vec![
            Span::styled("▶ Enter", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled("⤓ d", Style::default().fg(palette.fg)),
        ]));
    }

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(border_style)
            .style(Style::default().bg(palette.card_bg)),
    );
    frame.render_widget(card, area);
}

fn render_empty(frame: &mut Frame, area: Rect, palette: &Palette) {
    let top = area.height.saturating_sub(2) / 2;
    let mut lines = vec![Line::from(""); top as usize];
    lines.push(Line::from(Span::styled(
        EMPTY_TITLE,
        Style::default().fg(palette.muted).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(EMPTY_HINT, Style::default().fg(palette.border))));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        result.push(c);
        used += w;
    }
    result.push('…');
    result
}
