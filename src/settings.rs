//! Persisted user settings
//!
//! Two user-facing toggles survive restarts: whether suggestions are inserted
//! inline at the cursor, and whether suggestions are requested automatically
//! or only on demand. Settings are read once at startup and written on every
//! toggle.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ai::SuggestionMode;

const SETTINGS_DIR: &str = "codeassist";
const SETTINGS_FILE: &str = "settings.toml";

/// User settings persisted across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Insert suggestions inline at the cursor instead of the side panel
    #[serde(default)]
    pub inline_suggestions: bool,
    /// How suggestion fetches are triggered
    #[serde(default)]
    pub suggestion_mode: SuggestionMode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            inline_suggestions: false,
            suggestion_mode: SuggestionMode::Automatic,
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Load settings, falling back to defaults when the file is missing or invalid
pub fn load_settings() -> Settings {
    let Some(path) = settings_path() else {
        return Settings::default();
    };

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => return Settings::default(),
    };

    match toml::from_str(&contents) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Invalid settings file {:?}: {}", path, e);
            Settings::default()
        }
    }
}

/// No file locking - last writer wins if multiple instances run simultaneously.
pub fn save_settings(settings: &Settings) -> io::Result<()> {
    let Some(path) = settings_path() else {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine settings file path",
        ));
    };

    save_settings_to(settings, &path)
}

fn save_settings_to(settings: &Settings, path: &std::path::Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string(settings)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    fs::write(path, contents)
}
