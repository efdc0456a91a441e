use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    #[error(
        "API key not configured.\n\nSet 'api_key' in the [ai] section of ~/.config/codeassist/config.toml,\nor export the OPENAI_API_KEY environment variable."
    )]
    MissingApiKey,

    #[error("Could not read {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
}
