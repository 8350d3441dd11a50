//! # Playback Module
//!
//! The player controller and the backends it plays through.
//!
//! ## Overview
//!
//! - [`PlayerController`]: state machine for loading, transport, seek,
//!   volume, pitch, auto-advance and add-to-cart
//! - [`backend`]: waveform and plain adapters behind [`PlaybackBackend`],
//!   plus the one-way downgrade between them
//! - [`session`]: the shared session record and its state enum
//! - [`progress`]: progress bar math and time labels
//! - [`status`]: user-facing status messages

pub mod backend;
pub mod controller;
pub mod error;
pub mod progress;
pub mod session;
pub mod status;
pub mod traits;

pub use controller::{PlaybackDeps, PlayerController};
pub use error::{PlaybackError, Result};
pub use session::{playback_rate, PlaybackSession, PlayerState, SessionHandle};
pub use status::StatusReporter;
pub use traits::{
    BackendEvent, BackendKind, LayoutSource, LoadRequest, LoadTicket, PlaybackBackend,
    PlayerObserver, ProductNavigator,
};
