use crate::app::App;
use crate::overlay::{OpenOverlay, SEEK_STEP_SECS};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};

/// Full-screen playback overlay. The picture itself is in the player window.
pub fn render(app: &App, open: &OpenOverlay, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    let movie = open.movie();

    // Layout: top bar(1) + gap + body(min) + hints(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(area);

    // ── Title + buttons ──
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(26)])
        .split(chunks[0]);
    let title = Paragraph::new(Span::styled(
        format!(" {} ", movie.title),
        Style::default()
            .fg(Color::White)
            .bg(Color::Rgb(24, 24, 27))
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(title, top[0]);
    let buttons = Paragraph::new(Line::from(vec![
        Span::styled(" d ", Style::default().bg(Color::Rgb(24, 24, 27)).fg(Color::White)),
        Span::raw(" Download  "),
        Span::styled(" x ", Style::default().bg(Color::Rgb(24, 24, 27)).fg(Color::White)),
        Span::raw(" Close"),
    ]))
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Right);
    frame.render_widget(buttons, top[1]);

    // ── Playback state ──
    let state = if app.media_paused() {
        Span::styled("⏸  Paused", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("▶  Playing", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    };
    let position = match open.position() {
        Some(secs) => format_position(secs),
        None => "--:--".to_string(),
    };

    let mut body = vec![
        Line::from(""),
        Line::from(state),
        Line::from(Span::styled(position, Style::default().fg(Color::White))),
        Line::from(""),
    ];
    if let Some(genre) = &movie.genre {
        body.push(Line::from(Span::styled(genre.as_str(), Style::default().fg(Color::Gray))));
    }
    if let Some(duration) = &movie.duration_label {
        body.push(Line::from(Span::styled(
            format!("⏱ {}", duration),
            Style::default().fg(Color::Gray),
        )));
    }
    body.push(Line::from(Span::styled(
        movie.video_url.as_str(),
        Style::default().fg(Color::DarkGray),
    )));
    if let Some(error) = open.error() {
        body.push(Line::from(""));
        body.push(Line::from(Span::styled(error, Style::default().fg(Color::Red))));
    }
    frame.render_widget(Paragraph::new(body).alignment(Alignment::Center), chunks[2]);

    // ── Hints ──
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let hints = Line::from(vec![
        Span::styled(" Space", key),
        Span::raw(" Play/Pause  "),
        Span::styled("←/→", key),
        Span::raw(format!(" Seek {}s  ", SEEK_STEP_SECS)),
        Span::styled("Esc", key),
        Span::raw(" Close"),
    ]);
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::Gray)),
        chunks[3],
    );
}

/// `h:mm:ss` or `m:ss`.
pub fn format_position(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
