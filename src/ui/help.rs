use std::path::Path;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("q", "Quit application"),
            ("t", "Toggle dark/light theme"),
        ],
    ),
    (
        "Catalog",
        &[
            ("←↑↓→/hjkl", "Move between cards"),
            ("g/G", "Jump to first/last card"),
            ("/", "Search titles and genres"),
            ("Esc", "Clear search"),
            ("Enter/p", "Play selected movie"),
            ("d", "Download selected movie"),
        ],
    ),
    (
        "Player",
        &[
            ("Space", "Play/pause"),
            ("←/→", "Seek 10 seconds back/forward"),
            ("d", "Download this movie"),
            ("Esc/x", "Close player"),
        ],
    ),
];

pub fn render(frame: &mut Frame, log_path: Option<&Path>) {
    let area = centered_rect(60, 80, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let mut help_text = vec![Line::from("")];
    for (section, bindings) in SECTIONS {
        help_text.push(Line::from(Span::styled(
            format!("  {}", section),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for (keys, action) in *bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("    {:<12}", keys), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ]));
        }
        help_text.push(Line::from(""));
    }
    if let Some(path) = log_path {
        help_text.push(Line::from(vec![
            Span::styled("  Log file: ", Style::default().fg(Color::DarkGray)),
            Span::raw(path.display().to_string()),
        ]));
    }

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help — Keybindings ")
                .title_bottom(Line::from(" Press any key to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
