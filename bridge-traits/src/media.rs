//! Media engine bridge traits.
//!
//! The core drives two kinds of host audio engines:
//!
//! - a waveform engine provided by a visualization library that is loaded at
//!   runtime from a CDN ([`WaveformLibrary`] / [`WaveformEngine`]);
//! - a plain streaming media element ([`MediaElementFactory`] / [`MediaElement`]).
//!
//! Engines report lifecycle changes through a [`MediaSignalSink`] handed to
//! them at construction time. A fresh engine is created for every track load
//! and destroyed when the next load starts, so signals from one engine always
//! refer to a single media URL.

use crate::{error::Result, platform::PlatformSendSync};
use std::sync::Arc;

/// Lifecycle signal emitted by a host media engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSignal {
    /// Media is decoded (waveform) or metadata is loaded (plain) and playback
    /// can start.
    Ready { duration: Option<f64> },
    /// Periodic position update while playing.
    TimeUpdate {
        position: f64,
        duration: Option<f64>,
    },
    /// Playback reached the natural end of the media.
    Finished,
    /// Decode or runtime failure.
    Error { message: String },
}

/// Callback the host invokes for every [`MediaSignal`].
pub type MediaSignalSink = Arc<dyn Fn(MediaSignal) + Send + Sync>;

/// Fixed visual parameters of the waveform rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformStyle {
    pub wave_color: String,
    pub progress_color: String,
    pub cursor_color: String,
    pub bar_width: u32,
    pub bar_gap: u32,
    pub bar_radius: u32,
    /// Height in pixels when the player uses the compact (handheld) layout.
    pub compact_height: u32,
    /// Height in pixels for the regular layout.
    pub normal_height: u32,
}

impl WaveformStyle {
    pub fn height(&self, compact: bool) -> u32 {
        if compact {
            self.compact_height
        } else {
            self.normal_height
        }
    }
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            wave_color: "rgba(255, 255, 255, 0.3)".to_string(),
            progress_color: "#ffd700".to_string(),
            cursor_color: "#ffffff".to_string(),
            bar_width: 2,
            bar_gap: 1,
            bar_radius: 0,
            compact_height: 42,
            normal_height: 24,
        }
    }
}

/// Construction options for a single waveform engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformOptions {
    /// CSS selector of the container the waveform renders into.
    pub container: String,
    pub height: u32,
    pub style: WaveformStyle,
    pub normalize: bool,
}

/// Loader and constructor for the waveform visualization library.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait WaveformLibrary: PlatformSendSync {
    /// Whether the library is already present in the host environment.
    fn is_loaded(&self) -> bool;

    /// Load the library script from `source`. Resolves once the script has
    /// executed and the library global is available.
    async fn load_from(&self, source: &str) -> Result<()>;

    /// Construct an engine bound to `options.container`.
    fn create(
        &self,
        options: &WaveformOptions,
        sink: MediaSignalSink,
    ) -> Result<Arc<dyn WaveformEngine>>;
}

/// One live waveform engine instance.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait WaveformEngine: PlatformSendSync {
    /// Start fetching and decoding `url`. Completion arrives as
    /// [`MediaSignal::Ready`] or [`MediaSignal::Error`].
    fn load(&self, url: &str) -> Result<()>;

    /// Start playback. Rejections (autoplay policy, suspended audio context)
    /// surface as `BridgeError::Rejected`.
    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Stop playback and rewind.
    fn stop(&self);

    /// Seek to a fraction of the media in `0.0..=1.0`.
    fn seek_to(&self, fraction: f64);

    /// Volume in `0.0..=1.0`.
    fn set_volume(&self, volume: f64);

    fn set_playback_rate(&self, rate: f64);

    /// Current position in seconds.
    fn current_time(&self) -> f64;

    /// Duration in seconds once known.
    fn duration(&self) -> Option<f64>;

    /// Release the engine and its DOM. No signals are emitted afterwards.
    fn destroy(&self);
}

/// Constructor for plain streaming media elements.
pub trait MediaElementFactory: PlatformSendSync {
    fn create(&self, sink: MediaSignalSink) -> Result<Arc<dyn MediaElement>>;
}

/// A plain media element (HTML `<audio>` or a native equivalent).
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaElement: PlatformSendSync {
    /// Set the source and start loading. Metadata completion arrives as
    /// [`MediaSignal::Ready`].
    fn load(&self, url: &str) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Pause and drop the current source.
    fn stop(&self);

    /// Jump to an absolute position in seconds.
    fn set_current_time(&self, seconds: f64);

    fn set_volume(&self, volume: f64);

    fn set_playback_rate(&self, rate: f64);

    fn current_time(&self) -> f64;

    fn duration(&self) -> Option<f64>;

    /// Detach listeners and remove the element.
    fn destroy(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_style_defaults() {
        let style = WaveformStyle::default();
        assert_eq!(style.bar_width, 2);
        assert_eq!(style.bar_gap, 1);
        assert_eq!(style.progress_color, "#ffd700");
        assert_eq!(style.height(true), 42);
        assert_eq!(style.height(false), 24);
    }

    #[test]
    fn sink_receives_signals() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink: MediaSignalSink = Arc::new(move |signal| captured.lock().unwrap().push(signal));

        sink(MediaSignal::Ready { duration: Some(12.5) });
        sink(MediaSignal::Finished);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], MediaSignal::Finished);
    }
}
