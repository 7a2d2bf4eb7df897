use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use super::common::{panel_block, render_region, truncate_string};
use crate::app::{App, InputTarget, Panel};
use crate::view::{IssueRow, PanelContent, RegionBody, NO_ISSUES};

pub fn render(frame: &mut Frame, area: Rect, app: &App, body: &RegionBody) {
    let focused = app.focus == Panel::Issues;
    let outer = panel_block("Open-Source On-Ramp", focused);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    app.forms.skills.render(
        frame,
        chunks[0],
        "Your skills",
        app.input_target == Some(InputTarget::Skills),
    );

    let width = chunks[1].width as usize;
    render_region(
        frame,
        chunks[1],
        ratatui::widgets::Block::default(),
        body,
        app.spinner_char(),
        |frame, inner, content| match content {
            PanelContent::Issues { issues, cursor } => {
                let items: Vec<ListItem> = issues
                    .iter()
                    .map(|issue| ListItem::new(issue_lines(issue, width)))
                    .collect();
                let highlight = if focused {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let list = List::new(items).highlight_style(highlight);
                let mut state = ListState::default().with_selected(Some(*cursor));
                frame.render_stateful_widget(list, inner, &mut state);
            }
            PanelContent::NoIssues => {
                let empty = Paragraph::new(NO_ISSUES).style(Style::default().fg(Color::DarkGray));
                frame.render_widget(empty, inner);
            }
            _ => {}
        },
    );
}

/// Title, "in {repo}" and labels
fn issue_lines(issue: &IssueRow, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            truncate_string(&issue.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_string(&format!("in {}", issue.repo), width),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if !issue.labels.is_empty() {
        let labels = issue
            .labels
            .iter()
            .map(|l| format!("[{}]", l))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(
            truncate_string(&labels, width),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines
}
