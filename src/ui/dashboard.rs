use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::common::{panel_block, render_region};
use super::{chat, file_tree, footer, issue_list};
use crate::app::{App, InputTarget, Panel};
use crate::view::{PanelContent, ScreenView};

pub fn render(frame: &mut Frame, app: &App, screen: &ScreenView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Panels
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, screen.busy);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(chunks[1]);

    // Sidebar: stats + issue finder
    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(columns[0]);
    render_stats(frame, sidebar[0], app, screen);
    issue_list::render(frame, sidebar[1], app, &screen.issues);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    file_tree::render(frame, top[0], app, &screen.repository);
    render_viewer(frame, top[1], app, screen);
    render_analysis(frame, bottom[0], app, screen);
    chat::render(frame, bottom[1], app, &screen.chat);

    footer::render(frame, chunks[2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, busy: bool) {
    let mut spans = vec![Span::styled(
        format!("Welcome, {}!", app.display_name()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if busy {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} working...", app.spinner_char()),
            Style::default().fg(Color::Yellow),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Code Navigator"),
    );
    frame.render_widget(header, area);
}

fn render_stats(frame: &mut Frame, area: Rect, app: &App, screen: &ScreenView) {
    render_region(
        frame,
        area,
        panel_block("Your Stats", false),
        &screen.stats,
        app.spinner_char(),
        |frame, inner, content| {
            if let PanelContent::Stats(stats) = content {
                let lines = vec![
                    Line::from(format!("{} Public Repos", stats.public_repos)),
                    Line::from(format!("{} Followers", stats.followers)),
                    Line::from(format!("{} Following", stats.following)),
                ];
                frame.render_widget(Paragraph::new(lines), inner);
            }
        },
    );
}

fn render_viewer(frame: &mut Frame, area: Rect, app: &App, screen: &ScreenView) {
    let block = panel_block(screen.viewer.title.clone(), app.focus == Panel::Viewer);
    render_region(
        frame,
        area,
        block,
        &screen.viewer.body,
        app.spinner_char(),
        |frame, inner, content| {
            if let PanelContent::Text { text, scroll, .. } = content {
                let paragraph = Paragraph::new(text.as_str()).scroll((*scroll, 0));
                frame.render_widget(paragraph, inner);
            }
        },
    );
}

fn render_analysis(frame: &mut Frame, area: Rect, app: &App, screen: &ScreenView) {
    let focused = app.focus == Panel::Analysis;
    let outer = panel_block("Code Analysis", focused);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Code
            Constraint::Length(3), // Context
            Constraint::Min(4),    // Result
        ])
        .split(inner);

    app.forms.code.render(
        frame,
        chunks[0],
        "Code (Ctrl+S: analyze)",
        app.input_target == Some(InputTarget::Code),
    );
    app.forms.context.render(
        frame,
        chunks[1],
        "Context (c)",
        app.input_target == Some(InputTarget::Context),
    );

    render_region(
        frame,
        chunks[2],
        Block::default().borders(Borders::TOP).title("Result"),
        &screen.analysis,
        app.spinner_char(),
        |frame, inner, content| {
            if let PanelContent::Analysis {
                is_correct,
                explanation,
                correction,
            } = content
            {
                frame.render_widget(
                    Paragraph::new(analysis_lines(*is_correct, explanation, correction.as_deref()))
                        .wrap(Wrap { trim: false }),
                    inner,
                );
            }
        },
    );
}

fn analysis_lines<'a>(
    is_correct: bool,
    explanation: &'a str,
    correction: Option<&'a str>,
) -> Vec<Line<'a>> {
    let verdict = if is_correct {
        Span::styled("\u{2713} Looks correct", Style::default().fg(Color::Green))
    } else {
        Span::styled("\u{2717} Issues found", Style::default().fg(Color::Red))
    };
    let mut lines = vec![Line::from(verdict), Line::from("")];
    lines.extend(explanation.lines().map(Line::from));

    if let Some(code) = correction {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Corrected code",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(
            code.lines()
                .map(|l| Line::styled(l, Style::default().fg(Color::Green))),
        );
    }
    lines
}
