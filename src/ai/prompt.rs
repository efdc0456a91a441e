//! Prompt construction
//!
//! Builds the prompt sent to the completion endpoint from the current code
//! and language. The same (code, language) pair always yields the same
//! prompt string; the cache keys on it.

/// Build a continuation prompt for the given code and language.
pub fn build_prompt(code: &str, language: &str) -> String {
    format!(
        "Provide a continuation of the following {} code, adhering to best practices and standard conventions:\n\n{}",
        language, code
    )
}
