//! Playback controller.
//!
//! [`PlaybackController`] owns a [`NativeEngine`](crate::engine::NativeEngine)
//! and a [`PlaylistCursor`], forwards transport commands, and reconciles the
//! engine's asynchronous events into an ordered stream of [`Notification`]s.
//!
//! Threading: engine events may arrive on any thread. They are funneled into
//! the event bridge's inbox and interpreted on its dispatcher thread; the
//! consumer only ever sees notifications through its [`Notifications`]
//! receiver, drained from its own loop.

mod bridge;
mod controller;
mod cursor;
mod notify;

pub use controller::{ControllerOptions, PlaybackController};
pub use cursor::PlaylistCursor;
pub use notify::{ArtworkRef, Notification, Notifications, TrackInfo};
