//! Editing surface and suggestions panel
//!
//! Wraps the textarea widget behind the small interface the suggestion
//! pipeline consumes: read the current code and cursor, insert a suggestion
//! at a captured position, switch the syntax mode.

use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};
use tui_textarea::{CursorMove, Input, TextArea};

/// A cursor position captured from the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// Editor pane state
pub struct EditorState {
    pub textarea: TextArea<'static>,
    syntax_mode: String,
}

impl EditorState {
    pub fn new(initial_text: Option<String>, language: &str) -> Self {
        let mut textarea = match initial_text {
            Some(text) => TextArea::new(text.lines().map(str::to_string).collect()),
            None => TextArea::default(),
        };

        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Your Code ")
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        textarea.set_cursor_line_style(Style::default());
        textarea.set_tab_length(4);

        Self {
            textarea,
            syntax_mode: language.to_string(),
        }
    }

    /// The full editor contents
    pub fn current_code(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// The cursor position right now; the pipeline captures this at request
    /// initiation so delivery ignores later movement
    pub fn cursor_position(&self) -> Position {
        let (row, col) = self.textarea.cursor();
        Position { row, col }
    }

    /// Insert suggestion text at a previously captured position
    pub fn insert_suggestion_at(&mut self, position: Position, text: &str) {
        self.textarea
            .move_cursor(CursorMove::Jump(position.row as u16, position.col as u16));
        self.textarea.insert_str(text);
    }

    /// Switch the syntax mode shown for the buffer
    pub fn set_syntax_mode(&mut self, language: &str) {
        self.syntax_mode = language.to_string();
    }

    pub fn syntax_mode(&self) -> &str {
        &self.syntax_mode
    }

    /// Feed a raw input event to the textarea. Returns true if the buffer
    /// text changed.
    pub fn input(&mut self, input: impl Into<Input>) -> bool {
        self.textarea.input(input)
    }
}

/// Read-only suggestions panel state
#[derive(Debug, Default)]
pub struct PanelState {
    text: String,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the panel contents
    pub fn display(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
