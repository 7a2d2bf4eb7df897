use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::common::centered_rect;
use crate::app::App;
use crate::config::KeybindingsConfig;

pub fn render(frame: &mut Frame, app: &App) {
    let area = centered_rect(frame.area(), 60, 80);
    frame.render_widget(Clear, area);

    let help = Paragraph::new(help_lines(&app.config.keybindings)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(help, area);
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
}

fn help_lines(keys: &KeybindingsConfig) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        section("Navigation"),
        Line::from("  Tab / Shift-Tab  Cycle panel focus"),
        Line::from("  j/k, Down/Up     Move selection / scroll viewer"),
        Line::from("  Enter            Open issue plan / open file / toggle directory"),
        Line::from("  h/l              Collapse / expand directory"),
        Line::from(format!("  {}                Copy viewed file (File Viewer)", keys.yank)),
        Line::from(""),
        section("Editing"),
        Line::from("  / or i           Edit the focused panel's input"),
        Line::from("  c                Edit code context (Code Analysis)"),
        Line::from("  Enter            Submit single-line input"),
        Line::from("  Ctrl+S           Submit code for analysis"),
        Line::from("  Esc              Stop editing"),
        Line::from(""),
        section("Contribution Plan"),
        Line::from("  j/k              Select step"),
        Line::from("  Enter            Expand / collapse step"),
        Line::from("  Esc / q          Close"),
        Line::from(""),
        section("General"),
        Line::from(format!("  {}                Load sample code", keys.load_sample)),
        Line::from(format!("  {}                Refresh stats", keys.refresh_stats)),
        Line::from(format!("  {}                Log out", keys.logout)),
        Line::from(format!("  {}                Toggle help", keys.help)),
        Line::from("  q                Quit"),
    ]
}
