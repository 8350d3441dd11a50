//! Waveform backend.

use bridge_traits::media::{WaveformEngine, WaveformLibrary, WaveformOptions, WaveformStyle};
use futures::channel::mpsc::UnboundedSender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use super::{clamp_unit, signal_sink, transport_error};
use crate::error::{PlaybackError, Result};
use crate::traits::{BackendEvent, BackendKind, LoadRequest, PlaybackBackend};

/// Plays tracks through the waveform library, one engine per load.
pub struct WaveformBackend {
    library: Arc<dyn WaveformLibrary>,
    container: String,
    style: WaveformStyle,
    events: UnboundedSender<BackendEvent>,
    engine: Mutex<Option<Arc<dyn WaveformEngine>>>,
}

impl WaveformBackend {
    pub fn new(
        library: Arc<dyn WaveformLibrary>,
        container: impl Into<String>,
        style: WaveformStyle,
        events: UnboundedSender<BackendEvent>,
    ) -> Self {
        Self {
            library,
            container: container.into(),
            style,
            events,
            engine: Mutex::new(None),
        }
    }

    fn engine(&self) -> Option<Arc<dyn WaveformEngine>> {
        self.engine.lock().clone()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl PlaybackBackend for WaveformBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Waveform
    }

    fn load(&self, request: &LoadRequest) -> Result<()> {
        self.release();

        let options = WaveformOptions {
            container: self.container.clone(),
            height: self.style.height(request.compact),
            style: self.style.clone(),
            normalize: true,
        };
        let sink = signal_sink(self.events.clone(), request.ticket, BackendKind::Waveform);
        let engine = self
            .library
            .create(&options, sink)
            .map_err(|e| PlaybackError::BackendLoad(e.to_string()))?;

        *self.engine.lock() = Some(Arc::clone(&engine));

        let url = cache_busted(&request.url, core_async::time::now_millis());
        debug!(ticket = %request.ticket, %url, "Loading track into waveform engine");
        engine
            .load(&url)
            .map_err(|e| PlaybackError::BackendLoad(e.to_string()))
    }

    async fn play(&self) -> Result<()> {
        let engine = self.engine().ok_or(PlaybackError::NoProductLoaded)?;
        engine.play().await.map_err(transport_error)
    }

    async fn pause(&self) -> Result<()> {
        let engine = self.engine().ok_or(PlaybackError::NoProductLoaded)?;
        engine.pause().await.map_err(transport_error)
    }

    fn stop(&self) {
        if let Some(engine) = self.engine() {
            engine.stop();
        }
    }

    fn seek(&self, fraction: f64) {
        if let Some(engine) = self.engine() {
            engine.seek_to(clamp_unit(fraction));
        }
    }

    fn set_volume(&self, volume: f64) {
        if let Some(engine) = self.engine() {
            engine.set_volume(clamp_unit(volume));
        }
    }

    fn set_playback_rate(&self, rate: f64) {
        if let Some(engine) = self.engine() {
            engine.set_playback_rate(rate);
        }
    }

    fn current_time(&self) -> f64 {
        self.engine().map(|e| e.current_time()).unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.engine().and_then(|e| e.duration())
    }

    fn release(&self) {
        let previous = self.engine.lock().take();
        if let Some(engine) = previous {
            engine.stop();
            engine.destroy();
            debug!("Destroyed waveform engine");
        }
    }
}

/// Append a `t=<millis>` query parameter so the waveform fetch bypasses
/// caches that stripped CORS headers.
pub fn cache_busted(url: &str, millis: u64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, separator, millis)
}
