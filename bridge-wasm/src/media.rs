//! Plain `<audio>` media element.
//!
//! Used when the waveform library is unavailable or failed on a track. The
//! element is never attached to the document; detached audio elements play
//! the same way.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::media::{MediaElement, MediaElementFactory, MediaSignal, MediaSignalSink};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::error::{js_error, media_rejection, WasmError};
use crate::listener::EventListener;

/// `NaN` and `Infinity` (live streams) mean "unknown".
pub(crate) fn finite(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

#[derive(Default)]
pub struct Html5MediaFactory;

impl Html5MediaFactory {
    pub fn new() -> Self {
        Self
    }
}

impl MediaElementFactory for Html5MediaFactory {
    fn create(&self, sink: MediaSignalSink) -> BridgeResult<Arc<dyn MediaElement>> {
        let audio = HtmlAudioElement::new().map_err(|err| js_error("create audio", err))?;
        audio.set_preload("metadata");
        let element = Html5MediaElement {
            listeners: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
            audio,
        };
        element.attach(sink)?;
        Ok(Arc::new(element))
    }
}

pub struct Html5MediaElement {
    audio: HtmlAudioElement,
    listeners: RefCell<Vec<EventListener>>,
    destroyed: Cell<bool>,
}

impl Html5MediaElement {
    fn attach(&self, sink: MediaSignalSink) -> Result<(), WasmError> {
        let mut listeners = self.listeners.borrow_mut();

        let audio = self.audio.clone();
        let ready = sink.clone();
        listeners.push(EventListener::new(&self.audio, "loadedmetadata", move |_| {
            ready(MediaSignal::Ready {
                duration: finite(audio.duration()),
            });
        })?);

        let audio = self.audio.clone();
        let progress = sink.clone();
        listeners.push(EventListener::new(&self.audio, "timeupdate", move |_| {
            progress(MediaSignal::TimeUpdate {
                position: audio.current_time(),
                duration: finite(audio.duration()),
            });
        })?);

        let finished = sink.clone();
        listeners.push(EventListener::new(&self.audio, "ended", move |_| {
            finished(MediaSignal::Finished);
        })?);

        let audio = self.audio.clone();
        listeners.push(EventListener::new(&self.audio, "error", move |_| {
            let message = audio
                .error()
                .map(|error| format!("media error code {}", error.code()))
                .unwrap_or_else(|| "media error".to_string());
            sink(MediaSignal::Error { message });
        })?);

        Ok(())
    }
}

#[async_trait(?Send)]
impl MediaElement for Html5MediaElement {
    fn load(&self, url: &str) -> BridgeResult<()> {
        self.audio.set_src(url);
        self.audio.load();
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        let promise = self
            .audio
            .play()
            .map_err(|err| media_rejection("audio play", err))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| media_rejection("audio play", err))
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.audio
            .pause()
            .map_err(|err| js_error("audio pause", err))
    }

    fn stop(&self) {
        let _ = self.audio.pause();
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
    }

    fn set_current_time(&self, seconds: f64) {
        self.audio.set_current_time(seconds.max(0.0));
    }

    fn set_volume(&self, volume: f64) {
        self.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_playback_rate(&self, rate: f64) {
        // Vinyl pitch: tempo and pitch move together.
        let _ = js_sys::Reflect::set(
            &self.audio,
            &JsValue::from_str("preservesPitch"),
            &JsValue::FALSE,
        );
        self.audio.set_playback_rate(rate);
    }

    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn duration(&self) -> Option<f64> {
        finite(self.audio.duration())
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.listeners.borrow_mut().clear();
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::finite;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn unknown_durations_are_none() {
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(0.0), None);
        assert_eq!(finite(212.4), Some(212.4));
    }
}
