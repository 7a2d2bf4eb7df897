use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::common::{panel_block, render_region};
use crate::app::{App, InputTarget, Panel, TreeRow};
use crate::view::{PanelContent, PanelView};

pub fn render(frame: &mut Frame, area: Rect, app: &App, panel: &PanelView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    app.forms.repo_url.render(
        frame,
        chunks[0],
        "Repository URL",
        app.input_target == Some(InputTarget::RepoUrl),
    );

    let focused = app.focus == Panel::Repository;
    render_region(
        frame,
        chunks[1],
        panel_block(panel.title.clone(), focused),
        &panel.body,
        app.spinner_char(),
        |frame, inner, content| {
            if let PanelContent::Tree { rows, cursor } = content {
                render_rows(frame, inner, rows, *cursor, focused);
            }
        },
    );
}

fn render_rows(frame: &mut Frame, area: Rect, rows: &[TreeRow], cursor: usize, focused: bool) {
    let items: Vec<ListItem> = rows.iter().map(build_row_item).collect();
    let highlight = if focused {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let list = List::new(items).highlight_style(highlight);
    let mut state = ListState::default().with_selected(Some(cursor));
    frame.render_stateful_widget(list, area, &mut state);

    if rows.len() > 1 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut scrollbar_state =
            ScrollbarState::new(rows.len().saturating_sub(1)).position(cursor);
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

fn build_row_item(row: &TreeRow) -> ListItem<'static> {
    ListItem::new(Line::from(row_spans(row)))
}

fn row_spans(row: &TreeRow) -> Vec<Span<'static>> {
    let indent = "  ".repeat(row.depth);
    if !row.is_dir {
        return vec![Span::raw(format!("{indent}  {}", row.name))];
    }
    let marker = if row.expanded { "▾" } else { "▸" };
    let mut spans = vec![Span::styled(
        format!("{indent}{marker} {}/", row.name),
        Style::default().fg(Color::Blue),
    )];
    if row.not_loaded {
        spans.push(Span::styled(
            " (not loaded)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans
}
