//! AI suggestion pipeline
//!
//! Everything between a keystroke and a displayed suggestion: debounced
//! triggering, the response cache, the HTTP client with rate-limit retry,
//! and the worker thread that keeps network calls off the UI thread.

pub mod cache;
pub mod client;
pub mod debouncer;
pub mod prompt;
pub mod trigger;
pub mod worker;

pub use cache::SuggestionCache;
pub use client::{FailureKind, SuggestionClient, SuggestionResult};
pub use trigger::{
    FetchRequest, FetchResponse, SuggestionMode, SuggestionSurface, TriggerController,
};
