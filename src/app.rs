//! Application shell
//!
//! Ties the editor, suggestions panel, language selector, and trigger
//! controller together, and owns the event loop facing state.

pub mod events;
pub mod render;
pub mod state;

pub use state::App;
