use crate::ai::prompt::build_prompt;
use crate::ai::{SuggestionMode, SuggestionSurface, TriggerController};
use crate::config::Config;
use crate::editor::{EditorState, PanelState, Position};
use crate::language::LanguageSelector;
use crate::settings::{self, Settings};

/// Application state
pub struct App {
    pub editor: EditorState,
    pub panel: PanelState,
    pub languages: LanguageSelector,
    pub trigger: TriggerController,
    pub settings: Settings,
    status: String,
    should_quit: bool,
    dirty: bool,
}

/// Routes delivered suggestions to the editor or the panel
struct DeliverySurface<'a> {
    editor: &'a mut EditorState,
    panel: &'a mut PanelState,
}

impl SuggestionSurface for DeliverySurface<'_> {
    fn insert_at(&mut self, position: Position, text: &str) {
        self.editor.insert_suggestion_at(position, text);
    }

    fn show_in_panel(&mut self, text: &str) {
        self.panel.display(text);
    }
}

impl App {
    pub fn new(config: &Config, settings: Settings, initial_text: Option<String>) -> Self {
        let languages = LanguageSelector::new(config.editor.languages.clone());
        let editor = EditorState::new(initial_text, languages.current());
        let trigger = TriggerController::new(settings.suggestion_mode, config.ai.debounce_ms);

        Self {
            editor,
            panel: PanelState::new(),
            languages,
            trigger,
            settings,
            status: "Ready".to_string(),
            should_quit: false,
            dirty: true,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_render(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.dirty = true;
    }

    /// Called on every editor text change
    pub fn on_content_changed(&mut self) {
        self.trigger.on_content_changed();
        self.dirty = true;
    }

    /// Initiate a suggestion fetch for the current editor snapshot
    pub fn request_suggestion(&mut self) {
        let code = self.editor.current_code();
        let prompt = build_prompt(&code, self.languages.current());
        let cursor = self.editor.cursor_position();

        log::debug!("Requesting suggestion from API");
        if self.trigger.start_fetch(prompt, cursor) {
            self.set_status("Fetching suggestion...");
        } else {
            self.set_status("Suggestion worker unavailable");
        }
    }

    /// Per-iteration housekeeping: fire the debounce timer and drain
    /// completed fetches
    pub fn tick(&mut self) {
        if self.trigger.debounce_ready() {
            self.request_suggestion();
        }
        self.poll_suggestions();
    }

    /// Drain worker responses and deliver them to the editor or panel
    pub fn poll_suggestions(&mut self) {
        let App {
            trigger,
            editor,
            panel,
            settings,
            ..
        } = self;
        let mut surface = DeliverySurface { editor, panel };

        if trigger.poll_responses(&mut surface, settings.inline_suggestions) {
            self.set_status("Suggestion updated.");
        }
    }

    /// Switch to the next configured language.
    ///
    /// Clears the displayed suggestion and updates the editor's syntax mode;
    /// an in-flight fetch keeps running and remains subject to the stale
    /// guard.
    pub fn cycle_language(&mut self) {
        self.languages.cycle();
        let language = self.languages.current().to_string();
        log::info!("Language changed to {}", language);

        self.editor.set_syntax_mode(&language);
        self.panel.clear();
        self.set_status(format!("Language: {}", language));
    }

    /// Toggle inline suggestion display and persist the choice
    pub fn toggle_inline(&mut self) {
        self.settings.inline_suggestions = !self.settings.inline_suggestions;
        self.persist_settings();
        let state = if self.settings.inline_suggestions {
            "on"
        } else {
            "off"
        };
        self.set_status(format!("Inline suggestions {}", state));
    }

    /// Toggle between automatic and manual triggering and persist the choice
    pub fn toggle_mode(&mut self) {
        let mode = self.settings.suggestion_mode.toggled();
        self.settings.suggestion_mode = mode;
        self.trigger.set_mode(mode);
        self.persist_settings();
        self.set_status(format!("Suggestion mode: {}", mode.label()));
    }

    pub fn suggestion_mode(&self) -> SuggestionMode {
        self.trigger.mode()
    }

    fn persist_settings(&mut self) {
        if let Err(e) = settings::save_settings(&self.settings) {
            log::warn!("Failed to save settings: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
