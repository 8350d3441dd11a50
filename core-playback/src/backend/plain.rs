//! Plain media element backend.

use bridge_traits::media::{MediaElement, MediaElementFactory};
use futures::channel::mpsc::UnboundedSender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use super::{clamp_unit, signal_sink, transport_error};
use crate::error::{PlaybackError, Result};
use crate::traits::{BackendEvent, BackendKind, LoadRequest, PlaybackBackend};

/// Streams tracks through a plain media element. No visualization.
pub struct PlainBackend {
    factory: Arc<dyn MediaElementFactory>,
    events: UnboundedSender<BackendEvent>,
    element: Mutex<Option<Arc<dyn MediaElement>>>,
}

impl PlainBackend {
    pub fn new(factory: Arc<dyn MediaElementFactory>, events: UnboundedSender<BackendEvent>) -> Self {
        Self {
            factory,
            events,
            element: Mutex::new(None),
        }
    }

    fn element(&self) -> Option<Arc<dyn MediaElement>> {
        self.element.lock().clone()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl PlaybackBackend for PlainBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Plain
    }

    fn load(&self, request: &LoadRequest) -> Result<()> {
        self.release();

        let sink = signal_sink(self.events.clone(), request.ticket, BackendKind::Plain);
        let element = self
            .factory
            .create(sink)
            .map_err(|e| PlaybackError::BackendLoad(e.to_string()))?;
        *self.element.lock() = Some(Arc::clone(&element));

        debug!(ticket = %request.ticket, url = %request.url, "Loading track into media element");
        element
            .load(&request.url)
            .map_err(|e| PlaybackError::BackendLoad(e.to_string()))
    }

    async fn play(&self) -> Result<()> {
        let element = self.element().ok_or(PlaybackError::NoProductLoaded)?;
        element.play().await.map_err(transport_error)
    }

    async fn pause(&self) -> Result<()> {
        let element = self.element().ok_or(PlaybackError::NoProductLoaded)?;
        element.pause().await.map_err(transport_error)
    }

    fn stop(&self) {
        if let Some(element) = self.element() {
            element.stop();
        }
    }

    /// Without a known duration there is nothing to seek into.
    fn seek(&self, fraction: f64) {
        let Some(element) = self.element() else {
            return;
        };
        match element.duration() {
            Some(duration) if duration.is_finite() && duration > 0.0 => {
                element.set_current_time(clamp_unit(fraction) * duration);
            }
            _ => debug!("Ignoring seek before duration is known"),
        }
    }

    fn set_volume(&self, volume: f64) {
        if let Some(element) = self.element() {
            element.set_volume(clamp_unit(volume));
        }
    }

    fn set_playback_rate(&self, rate: f64) {
        if let Some(element) = self.element() {
            element.set_playback_rate(rate);
        }
    }

    fn current_time(&self) -> f64 {
        self.element().map(|e| e.current_time()).unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.element().and_then(|e| e.duration())
    }

    fn release(&self) {
        let previous = self.element.lock().take();
        if let Some(element) = previous {
            element.stop();
            element.destroy();
        }
    }
}
