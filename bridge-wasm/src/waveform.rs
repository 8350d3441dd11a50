//! WaveSurfer.js bindings.
//!
//! The library is not bundled: [`WaveSurferLibrary::load_from`] injects a
//! `<script>` tag for one CDN source and resolves once the `WaveSurfer`
//! global exists. [`WaveSurferEngine`] wraps a single instance created with
//! `WaveSurfer.create(options)`.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::media::{
    MediaSignal, MediaSignalSink, WaveformEngine, WaveformLibrary, WaveformOptions,
};
use futures::channel::oneshot;
use serde::Serialize;
use tracing::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlScriptElement};

use crate::error::{js_error, js_message, media_rejection, WasmError};
use crate::listener::EventListener;
use crate::media::finite;

const LIBRARY_GLOBAL: &str = "WaveSurfer";
/// Class set on the container while an engine renders into it.
pub const WAVEFORM_ACTIVE_CLASS: &str = "waveform-active";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = WaveSurfer)]
    type WaveSurfer;

    #[wasm_bindgen(static_method_of = WaveSurfer, js_class = "WaveSurfer", catch)]
    fn create(options: &JsValue) -> Result<WaveSurfer, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn load(this: &WaveSurfer, url: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn play(this: &WaveSurfer) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn pause(this: &WaveSurfer) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn stop(this: &WaveSurfer) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = seekTo)]
    fn seek_to(this: &WaveSurfer, progress: f64);

    #[wasm_bindgen(method, js_name = setVolume)]
    fn set_volume(this: &WaveSurfer, volume: f64);

    #[wasm_bindgen(method, js_name = setPlaybackRate)]
    fn set_playback_rate(this: &WaveSurfer, rate: f64, preserve_pitch: bool);

    #[wasm_bindgen(method, js_name = getCurrentTime)]
    fn get_current_time(this: &WaveSurfer) -> f64;

    #[wasm_bindgen(method, js_name = getDuration)]
    fn get_duration(this: &WaveSurfer) -> f64;

    /// Returns the unsubscribe function.
    #[wasm_bindgen(method)]
    fn on(this: &WaveSurfer, event: &str, callback: &JsValue) -> JsValue;

    #[wasm_bindgen(method)]
    fn destroy(this: &WaveSurfer);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WaveSurferOptions<'a> {
    container: &'a str,
    height: u32,
    wave_color: &'a str,
    progress_color: &'a str,
    cursor_color: &'a str,
    bar_width: u32,
    bar_gap: u32,
    bar_radius: u32,
    normalize: bool,
    interact: bool,
}

impl<'a> From<&'a WaveformOptions> for WaveSurferOptions<'a> {
    fn from(options: &'a WaveformOptions) -> Self {
        Self {
            container: &options.container,
            height: options.height,
            wave_color: &options.style.wave_color,
            progress_color: &options.style.progress_color,
            cursor_color: &options.style.cursor_color,
            bar_width: options.style.bar_width,
            bar_gap: options.style.bar_gap,
            bar_radius: options.style.bar_radius,
            normalize: options.normalize,
            interact: true,
        }
    }
}

/// Loader and constructor for WaveSurfer.js.
pub struct WaveSurferLibrary {
    document: Document,
}

impl WaveSurferLibrary {
    pub fn new() -> Result<Self, WasmError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| WasmError::NotAvailable("document".into()))?;
        Ok(Self { document })
    }

    async fn inject_script(&self, source: &str) -> BridgeResult<()> {
        let script = self
            .document
            .create_element("script")
            .map_err(|err| js_error("create script", err))?
            .dyn_into::<HtmlScriptElement>()
            .map_err(|_| BridgeError::OperationFailed("script element has wrong type".into()))?;
        script.set_src(source);
        script.set_async(true);

        let (sender, receiver) = oneshot::channel::<Result<(), String>>();
        let sender = std::rc::Rc::new(RefCell::new(Some(sender)));

        let on_load = {
            let sender = sender.clone();
            EventListener::new(&script, "load", move |_| {
                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(Ok(()));
                }
            })?
        };
        let on_error = {
            let source = source.to_string();
            EventListener::new(&script, "error", move |_| {
                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(Err(format!("script {source} failed to load")));
                }
            })?
        };

        let parent = self
            .document
            .head()
            .map(web_sys::Node::from)
            .or_else(|| self.document.body().map(web_sys::Node::from))
            .ok_or_else(|| BridgeError::NotAvailable("document head".into()))?;
        parent
            .append_child(&script)
            .map_err(|err| js_error("append script", err))?;

        // Settles only on the tag's own `load` or `error` event.
        let outcome = receiver
            .await
            .unwrap_or_else(|_| Err("script listener dropped".to_string()));

        drop(on_load);
        drop(on_error);
        if outcome.is_err() {
            script.remove();
        }
        outcome.map_err(BridgeError::NotAvailable)
    }
}

#[async_trait(?Send)]
impl WaveformLibrary for WaveSurferLibrary {
    fn is_loaded(&self) -> bool {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(LIBRARY_GLOBAL))
            .map(|value| value.is_function())
            .unwrap_or(false)
    }

    async fn load_from(&self, source: &str) -> BridgeResult<()> {
        if self.is_loaded() {
            return Ok(());
        }
        debug!(source, "injecting waveform library script");
        self.inject_script(source).await?;
        if self.is_loaded() {
            info!(source, "waveform library loaded");
            Ok(())
        } else {
            Err(BridgeError::NotAvailable(format!(
                "{source} loaded without defining {LIBRARY_GLOBAL}"
            )))
        }
    }

    fn create(
        &self,
        options: &WaveformOptions,
        sink: MediaSignalSink,
    ) -> BridgeResult<Arc<dyn WaveformEngine>> {
        let container = self
            .document
            .query_selector(&options.container)
            .map_err(|err| js_error("query waveform container", err))?
            .ok_or_else(|| {
                BridgeError::from(WasmError::ElementNotFound(options.container.clone()))
            })?;

        let js_options = serde_wasm_bindgen::to_value(&WaveSurferOptions::from(options))
            .map_err(|err| BridgeError::OperationFailed(format!("waveform options: {err}")))?;
        let inner = WaveSurfer::create(&js_options).map_err(|err| js_error("WaveSurfer.create", err))?;

        let _ = container.class_list().add_1(WAVEFORM_ACTIVE_CLASS);
        let engine = WaveSurferEngine {
            inner,
            container,
            callbacks: RefCell::new(Vec::new()),
            unsubscribe: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        };
        engine.subscribe(sink);
        Ok(Arc::new(engine))
    }
}

/// One WaveSurfer instance.
pub struct WaveSurferEngine {
    inner: WaveSurfer,
    container: web_sys::Element,
    callbacks: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
    unsubscribe: RefCell<Vec<js_sys::Function>>,
    destroyed: Cell<bool>,
}

impl WaveSurferEngine {
    fn on<F>(&self, event: &str, callback: F)
    where
        F: FnMut(JsValue) + 'static,
    {
        let callback = Closure::<dyn FnMut(JsValue)>::new(callback);
        let unsubscribe = self.inner.on(event, callback.as_ref());
        if let Ok(unsubscribe) = unsubscribe.dyn_into::<js_sys::Function>() {
            self.unsubscribe.borrow_mut().push(unsubscribe);
        }
        self.callbacks.borrow_mut().push(callback);
    }

    fn subscribe(&self, sink: MediaSignalSink) {
        let inner = self.inner.clone();
        let ready = sink.clone();
        self.on("ready", move |_| {
            ready(MediaSignal::Ready {
                duration: finite(inner.get_duration()),
            });
        });

        let inner = self.inner.clone();
        let progress = sink.clone();
        self.on("timeupdate", move |position| {
            progress(MediaSignal::TimeUpdate {
                position: position.as_f64().unwrap_or_else(|| inner.get_current_time()),
                duration: finite(inner.get_duration()),
            });
        });

        let finished = sink.clone();
        self.on("finish", move |_| finished(MediaSignal::Finished));

        self.on("error", move |error| {
            sink(MediaSignal::Error {
                message: js_message(&error),
            });
        });
    }
}

#[async_trait(?Send)]
impl WaveformEngine for WaveSurferEngine {
    fn load(&self, url: &str) -> BridgeResult<()> {
        let pending = self
            .inner
            .load(url)
            .map_err(|err| js_error("WaveSurfer.load", err))?;
        // Failures are also reported through the `error` event.
        if let Ok(promise) = pending.dyn_into::<js_sys::Promise>() {
            core_async::task::spawn(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    debug!(error = %js_message(&err), "waveform load promise rejected");
                }
            });
        }
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        let pending = self
            .inner
            .play()
            .map_err(|err| media_rejection("WaveSurfer.play", err))?;
        match pending.dyn_into::<js_sys::Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|err| media_rejection("WaveSurfer.play", err)),
            Err(_) => Ok(()),
        }
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.inner
            .pause()
            .map_err(|err| js_error("WaveSurfer.pause", err))
    }

    fn stop(&self) {
        let _ = self.inner.stop();
    }

    fn seek_to(&self, fraction: f64) {
        self.inner.seek_to(fraction.clamp(0.0, 1.0));
    }

    fn set_volume(&self, volume: f64) {
        self.inner.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_playback_rate(&self, rate: f64) {
        self.inner.set_playback_rate(rate, false);
    }

    fn current_time(&self) -> f64 {
        self.inner.get_current_time()
    }

    fn duration(&self) -> Option<f64> {
        finite(self.inner.get_duration())
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        for unsubscribe in self.unsubscribe.borrow_mut().drain(..) {
            let _ = unsubscribe.call0(&JsValue::NULL);
        }
        self.inner.destroy();
        self.callbacks.borrow_mut().clear();
        let _ = self.container.class_list().remove_1(WAVEFORM_ACTIVE_CLASS);
    }
}
