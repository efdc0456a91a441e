use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::state::App;

/// Height of the suggestions panel, including its borders
const PANEL_HEIGHT: u16 = 9;

impl App {
    /// Render the UI: header, editor, suggestions panel, status line
    pub fn render(&mut self, frame: &mut Frame) {
        let layout = Layout::vertical([
            Constraint::Length(1),            // Header with language indicator
            Constraint::Min(5),               // Editor takes the remaining space
            Constraint::Length(PANEL_HEIGHT), // Suggestions panel
            Constraint::Length(1),            // Status line
        ])
        .split(frame.area());

        self.render_header(frame, layout[0]);
        frame.render_widget(&self.editor.textarea, layout[1]);
        self.render_panel(frame, layout[2]);
        self.render_status_line(frame, layout[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let header = Line::from(vec![
            Span::styled(
                " CodeAssist ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Language: "),
            Span::styled(
                self.languages.current(),
                Style::default().fg(Color::Cyan),
            ),
        ]);
        frame.render_widget(Paragraph::new(header), area);
    }

    fn render_panel(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Suggestions ")
            .border_style(Style::default().fg(Color::DarkGray));

        let text = if self.panel.is_empty() {
            Span::styled(
                "No suggestion yet",
                Style::default().fg(Color::DarkGray),
            )
            .into()
        } else {
            ratatui::text::Text::raw(self.panel.text())
        };

        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: false }).block(block),
            area,
        );
    }

    fn render_status_line(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let inline = if self.settings.inline_suggestions {
            "inline"
        } else {
            "panel"
        };

        let status = Line::from(vec![
            Span::styled(
                format!(" [{}|{}] ", self.suggestion_mode().label(), inline),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(self.status().to_string()),
            Span::styled(
                "  F2 mode | F3 display | F4 language | F5 suggest | Ctrl+Q quit",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), area);
    }
}
