use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputTarget, Panel};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let footer =
        Paragraph::new(build_footer_line(app)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Key hints for the current mode
pub fn build_footer_line(app: &App) -> Line<'static> {
    let hint = match app.input_target {
        Some(InputTarget::Code) => "Ctrl+S: analyze | Esc: stop editing".to_string(),
        Some(_) => "Enter: submit | Esc: stop editing".to_string(),
        None if app.dashboard.plan_modal.is_some() => {
            "j/k: select step | Enter: expand | Esc: close".to_string()
        }
        None => {
            let keys = &app.config.keybindings;
            let panel = match app.focus {
                Panel::Issues => "/: skills | Enter: plan".to_string(),
                Panel::Repository => "/: repo URL | Enter: open | h/l: fold".to_string(),
                Panel::Viewer => format!("j/k: scroll | {}: copy file", keys.yank),
                Panel::Analysis => "/: code | c: context".to_string(),
                Panel::Chat => "/: message".to_string(),
            };
            format!(
                "Tab: focus | {} | {}: sample | {}: stats | {}: logout | {}: help | q: quit",
                panel, keys.load_sample, keys.refresh_stats, keys.logout, keys.help
            )
        }
    };

    let mut spans = vec![Span::raw(hint)];
    if let Some(notice) = &app.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Green)));
    }
    if app.dashboard.is_any_loading() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} Loading...", app.spinner_char()),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}
