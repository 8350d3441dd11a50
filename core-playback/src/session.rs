//! Player session state.
//!
//! [`PlaybackSession`] is the single record of what the player shows and
//! plays. The controller owns it behind a [`SessionHandle`]; observers and the
//! service read snapshots. Writers never hold the lock across an `.await`.

use core_catalog::{Product, Track};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::traits::{BackendKind, LoadTicket};

/// Lifecycle of the player.
///
/// ```text
/// Empty -> LoadingTrackData -> TrackReady -> Idle <-> Playing
///                 ^                 ^         |         |
///                 |                 +---------+---------+ (next/previous)
///                 +------------ Advancing <-------------+ (track finished)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Nothing loaded yet.
    Empty,
    /// Waiting for the track-data endpoint.
    LoadingTrackData,
    /// A track is selected and its media is loading.
    TrackReady,
    /// Media is ready and paused.
    Idle,
    Playing,
    /// Moving to the next track or product after one finished.
    Advancing,
}

impl PlayerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::Empty => "Empty",
            PlayerState::LoadingTrackData => "LoadingTrackData",
            PlayerState::TrackReady => "TrackReady",
            PlayerState::Idle => "Idle",
            PlayerState::Playing => "Playing",
            PlayerState::Advancing => "Advancing",
        }
    }

    /// States in which no fetch or advance is under way.
    pub fn is_settled(&self) -> bool {
        !matches!(self, PlayerState::LoadingTrackData | PlayerState::Advancing)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport request awaiting the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transport {
    Play,
    Pause,
}

/// Everything the player knows right now.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub state: PlayerState,
    pub product: Option<Product>,
    pub playlist: Vec<Track>,
    /// 0-based position in `playlist`.
    pub current_index: Option<usize>,
    pub playing: bool,
    /// Percent, `0..=100`. Survives track and backend changes.
    pub volume: u8,
    /// Signed pitch steps. Survives track and backend changes.
    pub pitch_step: i32,
    /// Start playback as soon as the current media is ready.
    pub pending_autoplay: bool,
    /// Set after two consecutive backend errors on the current track.
    pub playback_disabled: bool,
    pub backend: Option<BackendKind>,
    /// Seconds.
    pub position: f64,
    /// Seconds, once the engine knows.
    pub duration: Option<f64>,
    pub(crate) ticket: Option<LoadTicket>,
    /// The engine reported `Ready` for `ticket`.
    pub(crate) media_ready: bool,
    pub(crate) retried: bool,
    /// Bumped by every product or track load; delayed actions compare it.
    pub(crate) epoch: u64,
    pub(crate) transport: Option<Transport>,
}

impl PlaybackSession {
    pub fn new(volume: u8) -> Self {
        Self {
            state: PlayerState::Empty,
            product: None,
            playlist: Vec::new(),
            current_index: None,
            playing: false,
            volume: volume.min(100),
            pitch_step: 0,
            pending_autoplay: false,
            playback_disabled: false,
            backend: None,
            position: 0.0,
            duration: None,
            ticket: None,
            media_ready: false,
            retried: false,
            epoch: 0,
            transport: None,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    pub fn product_id(&self) -> Option<String> {
        self.product.as_ref().map(|p| p.id.to_string())
    }

    pub(crate) fn is_current(&self, ticket: LoadTicket) -> bool {
        self.ticket == Some(ticket)
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(80)
    }
}

/// Shared handle to the session.
pub type SessionHandle = Arc<RwLock<PlaybackSession>>;

/// Engine playback rate for `step` pitch steps of `step_percent` each.
pub fn playback_rate(step: i32, step_percent: u8) -> f64 {
    1.0 + f64::from(step) * f64::from(step_percent) / 100.0
}

/// Status-line text for a pitch step, e.g. `Pitch: +6%`.
pub fn pitch_label(step: i32, step_percent: u8) -> String {
    let percent = step * i32::from(step_percent);
    if percent > 0 {
        format!("Pitch: +{}%", percent)
    } else {
        format!("Pitch: {}%", percent)
    }
}

pub(crate) fn volume_fraction(percent: u8) -> f64 {
    f64::from(percent.min(100)) / 100.0
}
