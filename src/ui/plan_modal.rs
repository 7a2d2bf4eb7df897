use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::common::{centered_rect, render_region};
use crate::app::App;
use crate::view::{PanelContent, PlanStep, PlanView};

pub fn render(frame: &mut Frame, app: &App, plan: &PlanView) {
    let modal_area = centered_rect(frame.area(), 70, 70);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(plan.title)
        .title_bottom(Line::from(" j/k: select | Enter: expand | Esc: close ").centered())
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let subtitle = Paragraph::new(plan.subtitle.as_str())
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(subtitle, chunks[0]);

    render_region(
        frame,
        chunks[1],
        Block::default(),
        &plan.body,
        app.spinner_char(),
        |frame, inner, content| {
            if let PanelContent::Plan(steps) = content {
                let paragraph = Paragraph::new(step_lines(steps)).wrap(Wrap { trim: false });
                frame.render_widget(paragraph, inner);
            }
        },
    );
}

/// Accordion: a header per step, details only for expanded steps
fn step_lines(steps: &[PlanStep]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for step in steps {
        let marker = if step.expanded { "▾" } else { "▸" };
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if step.selected {
            style = style.bg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(
            format!("{marker} Step {}: {}", step.step, step.title),
            style,
        )));
        if step.expanded {
            lines.extend(
                step.details
                    .lines()
                    .map(|l| Line::from(format!("    {l}"))),
            );
            lines.push(Line::from(""));
        }
    }
    lines
}
