//! Fake host engines and a scripted storefront for controller tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::media::{
    MediaElement, MediaElementFactory, MediaSignal, MediaSignalSink, WaveformEngine,
    WaveformLibrary, WaveformOptions,
};
use bytes::Bytes;
use core_catalog::ProductId;
use core_playback::{BackendEvent, PlaybackDeps, PlayerController, ProductNavigator};
use core_runtime::config::PlayerConfig;
use core_runtime::events::EventBus;
use futures::channel::mpsc::UnboundedReceiver;
use mockall::mock;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub const AJAX: &str = "https://records.test/wp-admin/admin-ajax.php";
pub const PRIMARY_SOURCE: &str = "https://cdn-a.test/waveform.js";
pub const SECONDARY_SOURCE: &str = "https://cdn-b.test/waveform.js";

mock! {
    pub HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

// ============================================================================
// Storefront
// ============================================================================

pub fn record(title: &str, tracks: &[(&str, &str)]) -> Value {
    let tracks: Vec<Value> = tracks
        .iter()
        .map(|(name, url)| json!({"name": name, "url": url}))
        .collect();
    json!({"title": title, "artist": "Various", "label": "Test Press", "tracks": tracks})
}

/// Answers track requests from `products` and accepts every cart request.
/// Returns the mock and a counter of track-data requests.
pub fn shop(products: Vec<(&'static str, Value)>) -> (MockHttpClient, Arc<AtomicUsize>) {
    let table: HashMap<String, Value> = products
        .into_iter()
        .map(|(id, data)| (id.to_string(), data))
        .collect();
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);

    let mut http = MockHttpClient::new();
    http.expect_execute().returning(move |request| {
        let fields = request.form_fields().unwrap_or_default();
        let id = fields.get("product_id").cloned().unwrap_or_default();

        let body = if request.url.contains("wc-ajax=add_to_cart") {
            json!({"fragments": {"span.cart-count": "<span>1</span>"}, "cart_count": 1})
        } else {
            counter.fetch_add(1, Ordering::SeqCst);
            match table.get(&id) {
                Some(data) => json!({"success": true, "data": data}),
                None => json!({"success": false, "message": "Product not found"}),
            }
        };

        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(serde_json::to_vec(&body).unwrap()),
        })
    });
    (http, fetches)
}

/// Storefront whose response for one product waits until `gate` is notified.
pub struct HeldShop {
    inner: MockHttpClient,
    held: String,
    gate: Arc<Notify>,
}

impl HeldShop {
    pub fn new(inner: MockHttpClient, held: &str, gate: Arc<Notify>) -> Self {
        Self {
            inner,
            held: held.to_string(),
            gate,
        }
    }
}

#[async_trait]
impl HttpClient for HeldShop {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let held = request
            .form_fields()
            .and_then(|fields| fields.get("product_id").cloned())
            .is_some_and(|id| id == self.held);
        if held {
            self.gate.notified().await;
        }
        self.inner.execute(request).await
    }
}

// ============================================================================
// Host engines
// ============================================================================

/// Knobs shared by every engine the fakes create.
#[derive(Default)]
pub struct Controls {
    pub play_gate: Mutex<Option<Arc<Notify>>>,
    pub pause_gate: Mutex<Option<Arc<Notify>>>,
    pub reject_play: AtomicBool,
}

pub struct FakeMedia {
    sink: MediaSignalSink,
    controls: Arc<Controls>,
    pub options: Option<WaveformOptions>,
    pub loaded: Mutex<Vec<String>>,
    pub plays: AtomicUsize,
    pub pauses: AtomicUsize,
    pub destroyed: AtomicBool,
    pub volume: Mutex<Option<f64>>,
    pub rate: Mutex<Option<f64>>,
    pub positions: Mutex<Vec<f64>>,
    pub duration: Mutex<Option<f64>>,
}

impl FakeMedia {
    fn new(sink: MediaSignalSink, controls: Arc<Controls>, options: Option<WaveformOptions>) -> Self {
        Self {
            sink,
            controls,
            options,
            loaded: Mutex::new(Vec::new()),
            plays: AtomicUsize::new(0),
            pauses: AtomicUsize::new(0),
            destroyed: AtomicBool::new(false),
            volume: Mutex::new(None),
            rate: Mutex::new(None),
            positions: Mutex::new(Vec::new()),
            duration: Mutex::new(None),
        }
    }

    /// Fire a signal the way the host would.
    pub fn emit(&self, signal: MediaSignal) {
        if let MediaSignal::Ready { duration } = &signal {
            *self.duration.lock() = *duration;
        }
        (self.sink)(signal);
    }

    pub fn ready(&self, seconds: f64) {
        self.emit(MediaSignal::Ready {
            duration: Some(seconds),
        });
    }

    pub fn last_url(&self) -> Option<String> {
        self.loaded.lock().last().cloned()
    }

    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    async fn gated_play(&self) -> BridgeResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        let gate = self.controls.play_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.controls.reject_play.load(Ordering::SeqCst) {
            return Err(BridgeError::Rejected("NotAllowedError".into()));
        }
        Ok(())
    }

    async fn gated_pause(&self) -> BridgeResult<()> {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        let gate = self.controls.pause_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(())
    }
}

#[async_trait]
impl WaveformEngine for FakeMedia {
    fn load(&self, url: &str) -> BridgeResult<()> {
        self.loaded.lock().push(url.to_string());
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.gated_play().await
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.gated_pause().await
    }

    fn stop(&self) {}

    fn seek_to(&self, fraction: f64) {
        self.positions.lock().push(fraction);
    }

    fn set_volume(&self, volume: f64) {
        *self.volume.lock() = Some(volume);
    }

    fn set_playback_rate(&self, rate: f64) {
        *self.rate.lock() = Some(rate);
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> Option<f64> {
        *self.duration.lock()
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaElement for FakeMedia {
    fn load(&self, url: &str) -> BridgeResult<()> {
        self.loaded.lock().push(url.to_string());
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.gated_play().await
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.gated_pause().await
    }

    fn stop(&self) {}

    fn set_current_time(&self, seconds: f64) {
        self.positions.lock().push(seconds);
    }

    fn set_volume(&self, volume: f64) {
        *self.volume.lock() = Some(volume);
    }

    fn set_playback_rate(&self, rate: f64) {
        *self.rate.lock() = Some(rate);
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> Option<f64> {
        *self.duration.lock()
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

pub struct FakeLibrary {
    controls: Arc<Controls>,
    working_sources: Vec<String>,
    loaded: AtomicBool,
    pub attempts: Mutex<Vec<String>>,
    pub engines: Mutex<Vec<Arc<FakeMedia>>>,
}

impl FakeLibrary {
    pub fn new(controls: Arc<Controls>, working_sources: &[&str]) -> Self {
        Self {
            controls,
            working_sources: working_sources.iter().map(|s| s.to_string()).collect(),
            loaded: AtomicBool::new(false),
            attempts: Mutex::new(Vec::new()),
            engines: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WaveformLibrary for FakeLibrary {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    async fn load_from(&self, source: &str) -> BridgeResult<()> {
        self.attempts.lock().push(source.to_string());
        if self.working_sources.iter().any(|s| s == source) {
            self.loaded.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(BridgeError::OperationFailed(format!("script error: {}", source)))
        }
    }

    fn create(
        &self,
        options: &WaveformOptions,
        sink: MediaSignalSink,
    ) -> BridgeResult<Arc<dyn WaveformEngine>> {
        let engine = Arc::new(FakeMedia::new(
            sink,
            Arc::clone(&self.controls),
            Some(options.clone()),
        ));
        self.engines.lock().push(Arc::clone(&engine));
        Ok(engine)
    }
}

pub struct FakeFactory {
    controls: Arc<Controls>,
    pub elements: Mutex<Vec<Arc<FakeMedia>>>,
}

impl FakeFactory {
    pub fn new(controls: Arc<Controls>) -> Self {
        Self {
            controls,
            elements: Mutex::new(Vec::new()),
        }
    }

    pub fn last(&self) -> Arc<FakeMedia> {
        self.elements.lock().last().cloned().unwrap()
    }
}

impl MediaElementFactory for FakeFactory {
    fn create(&self, sink: MediaSignalSink) -> BridgeResult<Arc<dyn MediaElement>> {
        let element = Arc::new(FakeMedia::new(sink, Arc::clone(&self.controls), None));
        self.elements.lock().push(Arc::clone(&element));
        Ok(element)
    }
}

/// Fixed page order of products.
pub struct PageOrder(pub Vec<&'static str>);

impl ProductNavigator for PageOrder {
    fn next_product_after(&self, current: &ProductId) -> Option<ProductId> {
        let position = self.0.iter().position(|id| *id == current.as_str());
        let next = match position {
            Some(i) => self.0[(i + 1) % self.0.len()],
            None => *self.0.first()?,
        };
        ProductId::parse(next).ok()
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub controller: Arc<PlayerController>,
    pub library: Arc<FakeLibrary>,
    pub factory: Arc<FakeFactory>,
    pub controls: Arc<Controls>,
    pub bus: EventBus,
    signals: UnboundedReceiver<BackendEvent>,
}

impl Harness {
    /// Controller whose waveform library loads from `working_sources` only.
    pub fn new(http: impl HttpClient + 'static, working_sources: &[&str]) -> Self {
        let config = PlayerConfig::builder()
            .ajax_url(AJAX)
            .nonce("n0nce")
            .waveform_sources([PRIMARY_SOURCE, SECONDARY_SOURCE])
            .settle_delay(Duration::from_millis(2000))
            .autoplay_delay(Duration::from_millis(200))
            .http_client(Arc::new(http))
            .build()
            .unwrap();

        let controls = Arc::new(Controls::default());
        let library = Arc::new(FakeLibrary::new(Arc::clone(&controls), working_sources));
        let factory = Arc::new(FakeFactory::new(Arc::clone(&controls)));
        let bus = EventBus::new(256);

        let controller = Arc::new(PlayerController::new(
            &config,
            PlaybackDeps {
                waveform_library: Some(library.clone()),
                media_factory: factory.clone(),
            },
            bus.clone(),
        ));
        let signals = controller.take_backend_events().unwrap();

        Self {
            controller,
            library,
            factory,
            controls,
            bus,
            signals,
        }
    }

    /// Deliver every queued backend signal to the controller.
    pub async fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(Some(event)) = self.signals.try_next() {
            self.controller.handle_backend_event(event).await;
            delivered += 1;
        }
        delivered
    }

    /// Take the next queued signal without delivering it.
    pub fn take_signal(&mut self) -> Option<BackendEvent> {
        self.signals.try_next().ok().flatten()
    }

    pub fn engine(&self) -> Arc<FakeMedia> {
        self.library.engines.lock().last().cloned().unwrap()
    }

    pub fn engine_count(&self) -> usize {
        self.library.engines.lock().len()
    }

    pub fn element(&self) -> Arc<FakeMedia> {
        self.factory.last()
    }

    pub fn element_count(&self) -> usize {
        self.factory.elements.lock().len()
    }

    pub fn gate_play(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.controls.play_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_pause(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.controls.pause_gate.lock() = Some(Arc::clone(&gate));
        gate
    }
}
