mod grid;
mod header;
mod help;
mod player;
mod theme;

pub use grid::columns_for_width;

use crate::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use theme::Palette;

const FOOTER_LINKS: [&str; 3] = ["Terms of Service", "Privacy Policy", "Contact"];

/// Top-level render.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let palette = theme::palette(app.theme);
    frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), area);

    // Layout: header(3) + heading(2) + grid(min) + footer(2) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(area);

    header::render(app, frame, chunks[0], &palette);

    // ── Heading ──
    let heading = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {}", app.heading()),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" {}", app.count_line()),
            Style::default().fg(palette.muted),
        )),
    ]);
    frame.render_widget(heading, chunks[1]);

    // ── Grid ──
    let movies: Vec<_> = app.visible_movies().collect();
    grid::render(frame, chunks[2], &movies, app.selected, &palette);

    render_footer(frame, chunks[3], &palette);
    render_status(app, frame, chunks[4], &palette);

    if let Some(open) = app.overlay.open_overlay() {
        player::render(app, open, frame);
    }

    render_notifications(app, frame);

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame, app.log_path.as_deref());
    }
}

fn render_footer(frame: &mut Frame, area: Rect, palette: &Palette) {
    let mut spans = vec![
        Span::styled(" StreamFlix ", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::styled("Premium streaming experience   ", Style::default().fg(palette.muted)),
    ];
    for link in FOOTER_LINKS {
        spans.push(Span::styled(link, Style::default().fg(palette.muted)));
        spans.push(Span::raw("  "));
    }
    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(palette.border)),
    );
    frame.render_widget(footer, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let key = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    let status_line = Line::from(vec![
        Span::styled(" ←↑↓→", key),
        Span::raw(" Navigate  "),
        Span::styled("/", key),
        Span::raw(" Search  "),
        Span::styled("Enter", key),
        Span::raw(" Play  "),
        Span::styled("d", key),
        Span::raw(" Download  "),
        Span::styled("?", key),
        Span::raw(" Help  "),
        Span::styled("q", key),
        Span::raw(" Quit  "),
        Span::styled(&app.status_msg, Style::default().fg(palette.muted)),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(Style::default().fg(palette.fg)), area);
}

/// Stack toasts in the top-right corner.
fn render_notifications(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let width = 40.min(area.width);
    for (i, note) in app.notifications().enumerate() {
        let y = area.y + 1 + (i as u16) * 3;
        if y + 3 > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right() - width, y, width, 3);
        frame.render_widget(Clear, rect);
        let toast = Paragraph::new(Span::raw(grid::truncate_str(
            &format!("✓ {}", note.message),
            width.saturating_sub(2) as usize,
        )))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ratatui::style::Color::Green)),
        );
        frame.render_widget(toast, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Affordance, Theme};
    use crate::catalog::sample;
    use crate::host::Document;
    use crate::host::fakes::{FakeMedia, FakeSaver};
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;

    fn app() -> App {
        let mut app = App::new(
            Box::new(FakeMedia::default()),
            Box::new(FakeSaver::default()),
            Document::shared(),
            Theme::Dark,
            Duration::from_secs(5),
        );
        app.catalog_loaded(Ok(vec![
            sample("1", "Inception", Some("Sci-Fi")),
            sample("2", "The Matrix", Some("Sci-Fi")),
            sample("3", "Goodfellas", Some("Crime")),
        ]));
        app
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_grid_shows_cards() {
        let text = screen(&app());
        assert!(text.contains("Featured Movies"));
        assert!(text.contains("3 movies available"));
        assert!(text.contains("Inception"));
        assert!(text.contains("Goodfellas"));
        assert!(!text.contains(grid::EMPTY_TITLE));
    }

    #[test]
    fn test_empty_state_replaces_grid() {
        let mut app = app();
        app.set_search("zzz");
        let text = screen(&app);
        assert!(text.contains(grid::EMPTY_TITLE));
        assert!(text.contains(grid::EMPTY_HINT));
        assert!(!text.contains("Inception"));
    }

    #[test]
    fn test_overlay_covers_page() {
        let mut app = app();
        app.select_next();
        let action = app.card_action(Affordance::Play).unwrap();
        app.handle_card_action(action);
        let text = screen(&app);
        assert!(text.contains("The Matrix"));
        assert!(text.contains("Playing"));
        assert!(!text.contains("Featured Movies"));
    }

    #[test]
    fn test_help_shows_log_file() {
        let mut app = app();
        app.log_path = Some(std::path::PathBuf::from("/tmp/sf.log"));
        app.show_help = true;
        let text = screen(&app);
        assert!(text.contains("Log file: /tmp/sf.log"));
    }

    #[test]
    fn test_download_toast_is_drawn() {
        let mut app = app();
        let action = app.card_action(Affordance::Download).unwrap();
        app.handle_card_action(action);
        assert!(screen(&app).contains("Downloading Inception..."));
    }
}
