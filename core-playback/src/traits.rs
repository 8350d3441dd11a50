//! # Core Playback Traits
//!
//! Seams between the player controller and everything around it.
//!
//! - [`PlaybackBackend`] hides which host engine plays the current track.
//!   The controller only ever talks to this trait; the waveform and plain
//!   adapters in [`crate::backend`] implement it.
//! - [`PlayerObserver`] is how the page binding layer learns about renders,
//!   track changes and progress without the controller knowing the DOM.
//! - [`ProductNavigator`] and [`LayoutSource`] are the two questions the
//!   controller asks the page: "which product comes next?" and "is the
//!   layout compact?".
//!
//! ## Threading Model
//!
//! On native targets implementations must be `Send + Sync` so the controller
//! can live inside a Tokio task. On WASM the bounds collapse and async methods
//! use `?Send`.

use bridge_traits::media::MediaSignal;
use bridge_traits::platform::PlatformSendSync;
use core_catalog::{Product, ProductId, Track};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::session::PlayerState;

// ============================================================================
// Backend Types
// ============================================================================

/// Which engine plays the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Waveform visualization library with its own audio engine.
    Waveform,
    /// Plain streaming media element.
    Plain,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Waveform => "waveform",
            BackendKind::Plain => "plain",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one track load. Signals carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A host media signal tagged with the load it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendEvent {
    pub ticket: LoadTicket,
    pub backend: BackendKind,
    pub signal: MediaSignal,
}

/// Everything a backend needs to start loading one track.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub url: String,
    pub ticket: LoadTicket,
    /// Render for the compact (handheld) layout.
    pub compact: bool,
}

// ============================================================================
// Playback Backend
// ============================================================================

/// Uniform control surface over the host media engines.
///
/// A backend owns at most one live engine. `load` releases the previous one
/// before creating the next, so signals for a ticket only ever come from the
/// engine created for it.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait PlaybackBackend: PlatformSendSync {
    fn kind(&self) -> BackendKind;

    /// Release any current engine and start loading `request.url`.
    /// Readiness arrives later as a [`BackendEvent`].
    fn load(&self, request: &LoadRequest) -> Result<()>;

    /// Start playback of the loaded media.
    ///
    /// # Errors
    ///
    /// `TransportRejected` when the host refused, e.g. autoplay policy.
    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Stop and rewind without releasing the engine.
    fn stop(&self);

    /// Seek to `fraction` of the track, clamped to `0.0..=1.0`.
    fn seek(&self, fraction: f64);

    /// Volume in `0.0..=1.0`.
    fn set_volume(&self, volume: f64);

    fn set_playback_rate(&self, rate: f64);

    /// Current position in seconds, `0.0` without media.
    fn current_time(&self) -> f64;

    fn duration(&self) -> Option<f64>;

    /// Destroy the current engine. No signals follow.
    fn release(&self);
}

// ============================================================================
// Page-facing Seams
// ============================================================================

/// Callbacks for whoever renders the player. All methods default to no-ops.
pub trait PlayerObserver: PlatformSendSync {
    /// Track data for a product was fetched; render it.
    fn on_rendered(&self, _product: &Product, _tracks: &[Track]) {}

    /// `index` is the 0-based playlist position.
    fn on_track_changed(&self, _index: usize, _track: &Track) {}

    fn on_state_changed(&self, _state: PlayerState, _playing: bool) {}

    /// Position and duration in seconds.
    fn on_progress(&self, _position: f64, _duration: Option<f64>) {}
}

/// Answers which product follows the current one in page order.
pub trait ProductNavigator: PlatformSendSync {
    /// Next distinct product after `current`, wrapping to the first. Returns
    /// `current` itself when it is the only product on the page, `None` when
    /// the page has no products at all.
    fn next_product_after(&self, current: &ProductId) -> Option<ProductId>;
}

/// Tells backends whether to render for the compact layout.
pub trait LayoutSource: PlatformSendSync {
    fn is_compact(&self) -> bool;
}
