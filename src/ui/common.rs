use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::view::{PanelContent, RegionBody};

/// Bordered panel, highlighted when focused
pub fn panel_block(title: impl Into<String>, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title.into())
}

/// Render a region body inside `block`.
///
/// Idle shows the placeholder, Loading a spinner line and Failed an inline
/// error line. Retained overlay content is drawn below either line.
pub fn render_region<F>(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    body: &RegionBody,
    spinner: &str,
    render_content: F,
) where
    F: FnOnce(&mut Frame, Rect, &PanelContent),
{
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (status, stale) = match body {
        RegionBody::Idle(placeholder) => {
            let idle = Paragraph::new(placeholder.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: false });
            frame.render_widget(idle, inner);
            return;
        }
        RegionBody::Ready(content) => {
            render_content(frame, inner, content);
            return;
        }
        RegionBody::Loading { message, stale } => (
            Line::from(Span::styled(
                format!("{} {}", spinner, message),
                Style::default().fg(Color::Yellow),
            )),
            stale,
        ),
        RegionBody::Failed { message, stale } => (
            Line::from(Span::styled(
                format!("Error: {}", message),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            stale,
        ),
    };

    match stale {
        Some(content) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(inner);
            frame.render_widget(Paragraph::new(status), chunks[0]);
            render_content(frame, chunks[1], content);
        }
        None => {
            frame.render_widget(Paragraph::new(status).wrap(Wrap { trim: false }), inner);
        }
    }
}

/// Full-screen error (wiring failures only)
pub fn render_error(frame: &mut Frame, message: &str) {
    let error = Paragraph::new(format!("Error: {}", message))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Code Navigator"));
    frame.render_widget(error, frame.area());
}

/// Centered rect taking the given percentage of `area`
pub fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

/// Truncate a string to fit within a given display width
pub fn truncate_string(s: &str, max_width: usize) -> String {
    let width: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if width <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut truncated = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        truncated.push(c);
    }
    format!("{}...", truncated)
}
