//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and mirrors the player state
//! reported through controller notifications.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
