use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::common::centered_rect;
use crate::app::App;

pub fn render(frame: &mut Frame, app: &App) {
    let area = centered_rect(frame.area(), 60, 50);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Code Navigator");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Intro
            Constraint::Length(3), // Token input
            Constraint::Length(2), // Error
            Constraint::Min(0),
        ])
        .split(inner);

    let intro = Paragraph::new(vec![
        Line::styled(
            "Sign in to continue",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            "Explore repositories, find first issues and plan contributions.",
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(intro, chunks[0]);

    app.forms
        .login
        .render(frame, chunks[1], "Session token (Enter: sign in, Esc: quit)", true);

    if let Some(error) = &app.login_error {
        let error =
            Paragraph::new(format!("Error: {}", error)).style(Style::default().fg(Color::Red));
        frame.render_widget(error, chunks[2]);
    }
}

/// セッション復元中のスプラッシュ
pub fn render_splash(frame: &mut Frame, app: &App) {
    let splash = Paragraph::new(format!("{} Loading session...", app.spinner_char()))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Code Navigator"),
        );
    frame.render_widget(splash, frame.area());
}
