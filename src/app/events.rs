//! Event handling
//!
//! Polls the terminal with a short timeout so debounce expiry and worker
//! responses are still observed while the user is idle.

use std::io;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::App;

/// How long to wait for terminal events before running a tick
const POLL_INTERVAL: Duration = Duration::from_millis(50);

impl App {
    pub fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Resize(..) => self.mark_dirty(),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::F(2) => self.toggle_mode(),
            KeyCode::F(3) => self.toggle_inline(),
            KeyCode::F(4) => self.cycle_language(),
            // Explicit request; works in both modes. Ctrl+Space is what some
            // terminals deliver for the same chord.
            KeyCode::F(5) => self.request_suggestion(),
            KeyCode::Char(' ') if ctrl => self.request_suggestion(),
            _ => {
                if self.editor.input(key) {
                    self.on_content_changed();
                }
                self.mark_dirty();
            }
        }
    }
}
