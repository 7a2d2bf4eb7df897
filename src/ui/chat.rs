use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::common::{panel_block, render_region};
use crate::app::{App, ChatMessage, InputTarget, Panel, Sender};
use crate::view::{PanelContent, RegionBody};

pub fn render(frame: &mut Frame, area: Rect, app: &App, body: &RegionBody) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    render_region(
        frame,
        chunks[0],
        panel_block("Q&A Chat", app.focus == Panel::Chat),
        body,
        app.spinner_char(),
        |frame, inner, content| {
            if let PanelContent::Chat(messages) = content {
                let lines = transcript_lines(messages);
                // 末尾が見えるようにスクロール
                let overflow = lines.len().saturating_sub(inner.height as usize);
                let paragraph = Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .scroll((overflow.min(u16::MAX as usize) as u16, 0));
                frame.render_widget(paragraph, inner);
            }
        },
    );

    app.forms.chat.render(
        frame,
        chunks[1],
        "Message",
        app.input_target == Some(InputTarget::Chat),
    );
}

fn transcript_lines(messages: &[ChatMessage]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        let (label, color) = match message.sender {
            Sender::User => ("You", Color::Cyan),
            Sender::Assistant => ("Assistant", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            format!("{label}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(message.text.lines().map(|l| Line::from(format!("  {l}"))));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_lines_label_each_message() {
        let messages = vec![
            ChatMessage {
                text: "What does main do?".to_string(),
                sender: Sender::User,
            },
            ChatMessage {
                text: "It starts the server.\nThen waits.".to_string(),
                sender: Sender::Assistant,
            },
        ];
        let text: Vec<String> = transcript_lines(&messages)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(
            text,
            vec![
                "You:",
                "  What does main do?",
                "Assistant:",
                "  It starts the server.",
                "  Then waits.",
            ]
        );
    }
}
