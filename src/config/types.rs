// Top-level configuration type definitions

use serde::Deserialize;

use super::ai_types::AiConfig;

/// Default language list, in display order
fn default_languages() -> Vec<String> {
    vec![
        "Python".to_string(),
        "JavaScript".to_string(),
        "Java".to_string(),
    ]
}

/// Editor configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    /// Languages offered by the language selector, in display order
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            languages: default_languages(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// AI suggestion configuration
    #[serde(default)]
    pub ai: AiConfig,
    /// Editor configuration
    #[serde(default)]
    pub editor: EditorConfig,
}
