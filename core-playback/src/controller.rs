//! # Player Controller
//!
//! The state machine behind the single on-page player. It owns the
//! [`PlaybackSession`], asks the [`TrackDataClient`] for playlists, drives the
//! active [`PlaybackBackend`] and turns backend signals into state changes.
//!
//! ## Ordering
//!
//! Every track load gets a fresh [`LoadTicket`]. Backend signals carry the
//! ticket of the load that produced them and are dropped when it is no longer
//! current, so a late `Ready` from a superseded track can never start
//! playback. Every product or track load also bumps an epoch; delayed
//! actions (autoplay, the settle delay before a cross-product advance)
//! re-check it after sleeping.
//!
//! ## Usage
//!
//! ```ignore
//! let controller = PlayerController::new(&config, deps, bus.clone());
//! let mut signals = controller.take_backend_events().expect("first call");
//! controller.load_product("48213", true).await?;
//! while let Some(event) = signals.next().await {
//!     controller.handle_backend_event(event).await;
//! }
//! ```

use bridge_traits::media::{MediaElementFactory, MediaSignal, WaveformLibrary};
use bridge_traits::page::StatusSurface;
use core_async::time::sleep;
use core_catalog::{CartClient, CartOutcome, ErrorKind, Product, ProductId, Track, TrackDataClient};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
use futures::channel::mpsc::{self, UnboundedReceiver};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::backend::{BackendSelector, WaveformSettings};
use crate::error::{PlaybackError, Result};
use crate::progress::{progress_label, to_millis};
use crate::session::{
    pitch_label, playback_rate, volume_fraction, PlaybackSession, PlayerState, SessionHandle,
    Transport,
};
use crate::status::StatusReporter;
use crate::traits::{
    BackendEvent, BackendKind, LoadRequest, LayoutSource, LoadTicket, PlayerObserver,
    ProductNavigator,
};

// ============================================================================
// Construction
// ============================================================================

/// Host engines the controller plays through.
pub struct PlaybackDeps {
    /// `None` skips the waveform backend entirely.
    pub waveform_library: Option<Arc<dyn WaveformLibrary>>,
    pub media_factory: Arc<dyn MediaElementFactory>,
}

#[derive(Debug, Clone)]
struct ControllerSettings {
    settle_delay: Duration,
    autoplay_delay: Duration,
    pitch_step_percent: u8,
    max_pitch_steps: i32,
}

/// What the error path decided for the current track.
enum Recovery {
    /// Reload the same track, possibly on a downgraded backend.
    Retry { index: usize, autoplay: bool },
    GiveUp(PlaybackError),
    /// The failing load is no longer current.
    Stale,
}

enum PlayDecision {
    Start(LoadTicket),
    Queued,
    Noop,
    Reject(PlaybackError),
}

pub struct PlayerController {
    settings: ControllerSettings,
    tracks: TrackDataClient,
    cart: CartClient,
    backends: BackendSelector,
    session: SessionHandle,
    status: StatusReporter,
    events: EventBus,
    observers: RwLock<Vec<Arc<dyn PlayerObserver>>>,
    navigator: RwLock<Option<Arc<dyn ProductNavigator>>>,
    layout: RwLock<Option<Arc<dyn LayoutSource>>>,
    backend_events: Mutex<Option<UnboundedReceiver<BackendEvent>>>,
    next_ticket: AtomicU64,
}

impl PlayerController {
    pub fn new(config: &PlayerConfig, deps: PlaybackDeps, events: EventBus) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        let backends = BackendSelector::new(
            deps.waveform_library,
            deps.media_factory,
            WaveformSettings {
                sources: config.waveform_sources.clone(),
                container: config.waveform_container.clone(),
                style: config.waveform_style.clone(),
            },
            sender,
        );

        Self {
            settings: ControllerSettings {
                settle_delay: config.settle_delay,
                autoplay_delay: config.autoplay_delay,
                pitch_step_percent: config.pitch_step_percent,
                max_pitch_steps: config.max_pitch_steps,
            },
            tracks: TrackDataClient::from_config(config),
            cart: CartClient::from_config(config),
            backends,
            session: Arc::new(RwLock::new(PlaybackSession::new(config.initial_volume))),
            status: StatusReporter::new(events.clone(), config.status_dismiss_after),
            events,
            observers: RwLock::new(Vec::new()),
            navigator: RwLock::new(None),
            layout: RwLock::new(None),
            backend_events: Mutex::new(Some(receiver)),
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Signals from the host engines. Whoever takes the receiver must feed
    /// every event back into [`Self::handle_backend_event`].
    pub fn take_backend_events(&self) -> Option<UnboundedReceiver<BackendEvent>> {
        self.backend_events.lock().take()
    }

    pub fn add_observer(&self, observer: Arc<dyn PlayerObserver>) {
        self.observers.write().push(observer);
    }

    pub fn set_navigator(&self, navigator: Arc<dyn ProductNavigator>) {
        *self.navigator.write() = Some(navigator);
    }

    pub fn set_layout_source(&self, layout: Arc<dyn LayoutSource>) {
        *self.layout.write() = Some(layout);
    }

    pub fn set_status_surface(&self, surface: Arc<dyn StatusSurface>) {
        self.status.set_surface(surface);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session(&self) -> SessionHandle {
        Arc::clone(&self.session)
    }

    pub fn snapshot(&self) -> PlaybackSession {
        self.session.read().clone()
    }

    pub fn state(&self) -> PlayerState {
        self.session.read().state
    }

    pub fn is_playing(&self) -> bool {
        self.session.read().playing
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backends.current_kind()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetch `raw_id` and load its first track.
    pub async fn load_product(&self, raw_id: &str, autoplay: bool) -> Result<()> {
        self.load_product_at(raw_id, None, autoplay).await
    }

    /// Fetch `raw_id` and load the track at `track_index` (0-based), falling
    /// back to the first track when the index is out of range.
    ///
    /// On fetch failure the previous product stays loaded and the error is
    /// shown as a status message. The state it returns to reflects whatever
    /// the engine reported while the request was out.
    #[instrument(skip(self), fields(product_id = %raw_id))]
    pub async fn load_product_at(
        &self,
        raw_id: &str,
        track_index: Option<usize>,
        autoplay: bool,
    ) -> Result<()> {
        let product_id = match ProductId::parse(raw_id) {
            Ok(id) => id,
            Err(e) => {
                let err = PlaybackError::from(e);
                self.status.report(&err);
                return Err(err);
            }
        };

        let (epoch, playing) = {
            let mut s = self.session.write();
            s.epoch += 1;
            s.state = PlayerState::LoadingTrackData;
            (s.epoch, s.playing)
        };
        self.notify_state(PlayerState::LoadingTrackData, playing);
        self.status.info("Loading...");

        let loaded = match self.tracks.fetch_track_data(&product_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                let restored = {
                    let mut s = self.session.write();
                    if s.epoch == epoch {
                        let restored = restore_state(&s);
                        s.state = restored;
                        Some((s.state, s.playing))
                    } else {
                        None
                    }
                };
                if let Some((state, playing)) = restored {
                    self.notify_state(state, playing);
                }
                let err = PlaybackError::from(e);
                self.status.report(&err);
                return Err(err);
            }
        };

        {
            let mut s = self.session.write();
            if s.epoch != epoch {
                debug!("Track data arrived for a superseded load");
                return Ok(());
            }
            s.product = Some(loaded.product.clone());
            s.playlist = loaded.tracks.clone();
            s.current_index = None;
        }

        info!(title = %loaded.product.title, tracks = loaded.tracks.len(), "Product loaded");
        self.emit(PlayerEvent::ProductLoaded {
            product_id: loaded.product.id.to_string(),
            title: loaded.product.title.clone(),
            track_count: loaded.tracks.len(),
        });
        self.notify_rendered(&loaded.product, &loaded.tracks);

        let index = match track_index {
            Some(i) if i < loaded.tracks.len() => i,
            Some(i) => {
                warn!(index = i, tracks = loaded.tracks.len(), "Requested track out of range, starting at the first");
                0
            }
            None => 0,
        };
        self.start_track(index, autoplay, false).await
    }

    /// Load the track at `index` of the current playlist.
    pub async fn load_track(&self, index: usize, autoplay: bool) -> Result<()> {
        self.start_track(index, autoplay, false).await
    }

    /// A playlist click: load and play.
    pub async fn select_track(&self, index: usize) -> Result<()> {
        self.start_track(index, true, false).await
    }

    async fn start_track(&self, index: usize, autoplay: bool, retry: bool) -> Result<()> {
        let mut retry = retry;
        let mut autoplay = autoplay;
        let mut index = index;

        loop {
            let ticket = LoadTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1);
            let (track, product_id) = {
                let mut s = self.session.write();
                let Some(track) = s.playlist.get(index).cloned() else {
                    warn!(index, tracks = s.playlist.len(), "Ignoring load of a track outside the playlist");
                    return Ok(());
                };
                s.epoch += 1;
                s.ticket = Some(ticket);
                s.media_ready = false;
                s.current_index = Some(index);
                s.pending_autoplay = autoplay;
                s.playing = false;
                s.transport = None;
                s.retried = retry;
                s.playback_disabled = false;
                s.position = 0.0;
                s.duration = None;
                s.state = PlayerState::TrackReady;
                (track, s.product_id().unwrap_or_default())
            };

            debug!(%ticket, index, name = %track.name, "Loading track");
            self.emit(PlayerEvent::TrackChanged {
                product_id,
                index,
                name: track.name.clone(),
            });
            for observer in self.observers() {
                observer.on_track_changed(index, &track);
            }
            self.notify_state(PlayerState::TrackReady, false);

            let acquired = match self.backends.acquire().await {
                Ok(acquired) => acquired,
                Err(e) => return Err(self.disable_track(e)),
            };
            if let Some(reason) = acquired.switched {
                self.announce_switch(BackendKind::Waveform, acquired.backend.kind(), &reason);
            }

            let (volume, rate) = {
                let mut s = self.session.write();
                if !s.is_current(ticket) {
                    debug!(%ticket, "Track load superseded while acquiring a backend");
                    return Ok(());
                }
                s.backend = Some(acquired.backend.kind());
                (
                    volume_fraction(s.volume),
                    playback_rate(s.pitch_step, self.settings.pitch_step_percent),
                )
            };

            let request = LoadRequest {
                url: track.url.clone(),
                ticket,
                compact: self.is_compact(),
            };
            let backend = acquired.backend;
            match backend.load(&request) {
                Ok(()) => {
                    backend.set_volume(volume);
                    backend.set_playback_rate(rate);
                    return Ok(());
                }
                Err(e) => match self.plan_recovery(ticket, &e.to_string()) {
                    Recovery::Retry {
                        index: next_index,
                        autoplay: next_autoplay,
                    } => {
                        index = next_index;
                        autoplay = next_autoplay;
                        retry = true;
                    }
                    Recovery::GiveUp(err) => return Err(err),
                    Recovery::Stale => return Ok(()),
                },
            }
        }
    }

    // ========================================================================
    // Backend Signals
    // ========================================================================

    /// Apply one backend signal. Signals for superseded loads are dropped.
    #[instrument(skip(self, event), fields(ticket = %event.ticket, backend = %event.backend))]
    pub async fn handle_backend_event(&self, event: BackendEvent) {
        if !self.session.read().is_current(event.ticket) {
            debug!(signal = ?event.signal, "Ignoring signal from a superseded load");
            return;
        }

        match event.signal {
            MediaSignal::Ready { duration } => self.on_ready(event.ticket, event.backend, duration).await,
            MediaSignal::TimeUpdate { position, duration } => self.on_time_update(position, duration),
            MediaSignal::Finished => self.on_finished().await,
            MediaSignal::Error { message } => {
                warn!(%message, "Backend reported an error");
                if let Recovery::Retry { index, autoplay } = self.plan_recovery(event.ticket, &message) {
                    if let Err(e) = self.start_track(index, autoplay, true).await {
                        debug!(error = %e, "Retry after backend error failed");
                    }
                }
            }
        }
    }

    async fn on_ready(&self, ticket: LoadTicket, backend: BackendKind, duration: Option<f64>) {
        let (autoplay, changed) = {
            let mut s = self.session.write();
            s.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
            s.retried = false;
            s.media_ready = true;
            let autoplay = s.pending_autoplay;
            let changed = s.state == PlayerState::TrackReady;
            if changed {
                s.state = PlayerState::Idle;
            }
            (autoplay, changed)
        };
        if changed {
            self.notify_state(PlayerState::Idle, false);
        }
        self.status.success(match backend {
            BackendKind::Waveform => "Waveform ready",
            BackendKind::Plain => "Audio ready",
        });

        if !autoplay {
            return;
        }
        sleep(self.settings.autoplay_delay).await;
        let proceed = {
            let mut s = self.session.write();
            s.is_current(ticket) && std::mem::take(&mut s.pending_autoplay)
        };
        if !proceed {
            debug!(%ticket, "Autoplay skipped, track changed or paused during delay");
            return;
        }
        if let Err(e) = self.play().await {
            debug!(error = %e, "Autoplay did not start");
        }
    }

    fn on_time_update(&self, position: f64, duration: Option<f64>) {
        let duration = {
            let mut s = self.session.write();
            s.position = if position.is_finite() { position.max(0.0) } else { 0.0 };
            if let Some(d) = duration.filter(|d| d.is_finite() && *d > 0.0) {
                s.duration = Some(d);
            }
            s.duration
        };

        self.emit(PlayerEvent::Progress {
            position_ms: to_millis(position),
            duration_ms: duration.map(to_millis),
            label: progress_label(position, duration),
        });
        for observer in self.observers() {
            observer.on_progress(position, duration);
        }
    }

    async fn on_finished(&self) {
        let (product_id, index, len, fetching) = {
            let mut s = self.session.write();
            s.playing = false;
            s.transport = None;
            let fetching = s.state == PlayerState::LoadingTrackData;
            if !fetching {
                s.state = PlayerState::Advancing;
            }
            (
                s.product_id().unwrap_or_default(),
                s.current_index.unwrap_or(0),
                s.playlist.len(),
                fetching,
            )
        };

        info!(index, "Track finished");
        self.emit(PlayerEvent::Completed {
            product_id,
            index,
        });
        if fetching {
            self.notify_state(PlayerState::LoadingTrackData, false);
            return;
        }
        self.notify_state(PlayerState::Advancing, false);

        let result = if index + 1 < len {
            self.start_track(index + 1, true, false).await
        } else {
            self.advance_to_next_product().await
        };
        if let Err(e) = result {
            debug!(error = %e, "Advance after track end failed");
        }
    }

    /// Decide what to do after a backend failure on `ticket`: retry once,
    /// downgrading from the waveform backend if it was active, then give up.
    fn plan_recovery(&self, ticket: LoadTicket, message: &str) -> Recovery {
        let (retried, index, autoplay) = {
            let s = self.session.read();
            if !s.is_current(ticket) {
                return Recovery::Stale;
            }
            let Some(index) = s.current_index else {
                return Recovery::Stale;
            };
            (s.retried, index, s.pending_autoplay || s.playing)
        };

        if retried {
            return Recovery::GiveUp(self.disable_track(PlaybackError::BackendRuntime(message.to_string())));
        }

        if self.backends.downgrade(message).is_some() {
            self.announce_switch(BackendKind::Waveform, BackendKind::Plain, message);
        }
        info!(index, "Retrying track after backend error");
        Recovery::Retry { index, autoplay }
    }

    fn disable_track(&self, error: PlaybackError) -> PlaybackError {
        {
            let mut s = self.session.write();
            s.state = PlayerState::Idle;
            s.playing = false;
            s.pending_autoplay = false;
            s.transport = None;
            s.playback_disabled = true;
        }
        self.notify_state(PlayerState::Idle, false);
        self.status.report(&error);
        self.emit(PlayerEvent::Error {
            message: error.to_string(),
            recoverable: false,
        });
        error
    }

    fn announce_switch(&self, from: BackendKind, to: BackendKind, reason: &str) {
        self.session.write().backend = Some(to);
        self.emit(PlayerEvent::BackendSwitched {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
        });
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start playback. While the track is still loading the request is queued
    /// and honored on `Ready`.
    #[instrument(skip(self))]
    pub async fn play(&self) -> Result<()> {
        let decision = {
            let mut s = self.session.write();
            let state = s.state;
            match state {
                _ if s.playback_disabled => PlayDecision::Reject(PlaybackError::PlaybackDisabled),
                PlayerState::Empty => PlayDecision::Reject(PlaybackError::NoProductLoaded),
                PlayerState::TrackReady => {
                    s.pending_autoplay = true;
                    PlayDecision::Queued
                }
                PlayerState::Idle if s.transport.is_none() && !s.playing => match s.ticket {
                    Some(ticket) => {
                        s.transport = Some(Transport::Play);
                        s.pending_autoplay = false;
                        PlayDecision::Start(ticket)
                    }
                    None => PlayDecision::Reject(PlaybackError::NoProductLoaded),
                },
                _ => PlayDecision::Noop,
            }
        };

        let ticket = match decision {
            PlayDecision::Start(ticket) => ticket,
            PlayDecision::Queued => {
                debug!("Play queued until the track is ready");
                return Ok(());
            }
            PlayDecision::Noop => return Ok(()),
            PlayDecision::Reject(err) => {
                if matches!(err, PlaybackError::PlaybackDisabled) {
                    self.status.report(&err);
                } else {
                    warn!(error = %err, "Play requested without a loaded product");
                }
                return Err(err);
            }
        };

        let Some(backend) = self.backends.current() else {
            self.session.write().transport = None;
            return Err(PlaybackError::NoProductLoaded);
        };
        let result = backend.play().await;

        let started = {
            let mut s = self.session.write();
            if !s.is_current(ticket) {
                debug!(%ticket, "Play resolved for a superseded track");
                return Ok(());
            }
            s.transport = None;
            if result.is_ok() {
                s.playing = true;
                s.state = PlayerState::Playing;
            }
            (s.product_id().unwrap_or_default(), s.current_index.unwrap_or(0))
        };

        match result {
            Ok(()) => {
                self.emit(PlayerEvent::Started {
                    product_id: started.0,
                    index: started.1,
                });
                self.notify_state(PlayerState::Playing, true);
                Ok(())
            }
            Err(e) => {
                self.status.report(&e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<()> {
        let ticket = {
            let mut s = self.session.write();
            match s.ticket {
                Some(ticket) if s.playing && s.transport.is_none() => {
                    s.transport = Some(Transport::Pause);
                    ticket
                }
                _ => {
                    s.pending_autoplay = false;
                    return Ok(());
                }
            }
        };

        let Some(backend) = self.backends.current() else {
            self.session.write().transport = None;
            return Ok(());
        };
        let result = backend.pause().await;
        let position = backend.current_time();

        let paused = {
            let mut s = self.session.write();
            if !s.is_current(ticket) {
                return Ok(());
            }
            s.transport = None;
            if result.is_ok() {
                s.playing = false;
                s.state = PlayerState::Idle;
                s.position = position;
            }
            (s.product_id().unwrap_or_default(), s.current_index.unwrap_or(0))
        };

        match result {
            Ok(()) => {
                self.emit(PlayerEvent::Paused {
                    product_id: paused.0,
                    index: paused.1,
                    position_ms: to_millis(position),
                });
                self.notify_state(PlayerState::Idle, false);
                Ok(())
            }
            Err(e) => {
                self.status.error(e.kind(), format!("Pause error: {}", e));
                Err(e)
            }
        }
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        if self.is_playing() {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Next track, or the next product on the page after the last track.
    pub async fn next(&self) -> Result<()> {
        let (index, len) = {
            let s = self.session.read();
            (s.current_index, s.playlist.len())
        };
        let Some(index) = index else {
            debug!("Next ignored, nothing loaded");
            return Ok(());
        };
        if index + 1 < len {
            self.start_track(index + 1, true, false).await
        } else {
            self.advance_to_next_product().await
        }
    }

    /// Previous track. Does nothing on the first track.
    pub async fn previous(&self) -> Result<()> {
        let index = self.session.read().current_index;
        match index {
            Some(i) if i > 0 => self.start_track(i - 1, true, false).await,
            _ => Ok(()),
        }
    }

    /// Move past the last track: wait for the settle delay, then load the
    /// next product from the navigator, wrapping to the first. A single
    /// product replays from its first track.
    async fn advance_to_next_product(&self) -> Result<()> {
        let (current, epoch) = {
            let mut s = self.session.write();
            let Some(product) = s.product.as_ref() else {
                return Ok(());
            };
            let current = product.id.clone();
            s.state = PlayerState::Advancing;
            s.playing = false;
            s.pending_autoplay = false;
            s.transport = None;
            (current, s.epoch)
        };
        if let Some(backend) = self.backends.current() {
            backend.stop();
        }
        self.notify_state(PlayerState::Advancing, false);

        let navigator = self.navigator.read().clone();
        let Some(next) = navigator.and_then(|n| n.next_product_after(&current)) else {
            info!("No further products on the page");
            self.settle_idle(epoch);
            return Ok(());
        };

        info!(from = %current, to = %next, delay_ms = self.settings.settle_delay.as_millis() as u64, "Advancing to next product");
        sleep(self.settings.settle_delay).await;
        if self.session.read().epoch != epoch {
            debug!("Cross-product advance superseded by a newer load");
            return Ok(());
        }

        if next == current {
            self.start_track(0, true, false).await
        } else {
            self.load_product_at(next.as_str(), None, true).await
        }
    }

    fn settle_idle(&self, epoch: u64) {
        let changed = {
            let mut s = self.session.write();
            if s.epoch != epoch || s.state != PlayerState::Advancing {
                false
            } else {
                s.state = PlayerState::Idle;
                true
            }
        };
        if changed {
            self.notify_state(PlayerState::Idle, false);
        }
    }

    // ========================================================================
    // Seek, Volume, Pitch
    // ========================================================================

    /// Seek to `fraction` of the current track.
    pub fn seek(&self, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            warn!(fraction, "Rejecting non-finite seek");
            return Err(PlaybackError::InvalidInput(format!("seek fraction {}", fraction)));
        }
        let has_media = {
            let s = self.session.read();
            s.ticket.is_some() && s.state != PlayerState::Empty
        };
        let backend = self.backends.current().filter(|_| has_media);
        let Some(backend) = backend else {
            return Err(PlaybackError::NoProductLoaded);
        };
        backend.seek(fraction.clamp(0.0, 1.0));
        Ok(())
    }

    /// Seek from a click at `offset_x` on a `width` pixel progress bar.
    pub fn seek_click(&self, offset_x: f64, width: f64) -> Result<()> {
        let fraction = crate::progress::click_fraction(offset_x, width).ok_or_else(|| {
            PlaybackError::InvalidInput(format!("click at {} of {}", offset_x, width))
        })?;
        self.seek(fraction)
    }

    /// Set volume in percent, clamped to `0..=100`. Returns the stored value.
    pub fn set_volume(&self, percent: i32) -> u8 {
        let volume = percent.clamp(0, 100) as u8;
        self.session.write().volume = volume;
        if let Some(backend) = self.backends.current() {
            backend.set_volume(volume_fraction(volume));
        }
        volume
    }

    /// Set the pitch step, clamped to the configured range. Returns the
    /// resulting playback rate.
    pub fn set_pitch(&self, step: i32) -> f64 {
        let max = self.settings.max_pitch_steps;
        let step = step.clamp(-max, max);
        self.session.write().pitch_step = step;

        let rate = playback_rate(step, self.settings.pitch_step_percent);
        if let Some(backend) = self.backends.current() {
            backend.set_playback_rate(rate);
        }
        self.status.info(pitch_label(step, self.settings.pitch_step_percent));
        rate
    }

    pub fn adjust_pitch(&self, delta: i32) -> f64 {
        let step = self.session.read().pitch_step;
        self.set_pitch(step.saturating_add(delta))
    }

    // ========================================================================
    // Cart
    // ========================================================================

    /// Add the current product to the storefront cart.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self) -> Result<CartOutcome> {
        let product_id = self.session.read().product.as_ref().map(|p| p.id.clone());
        let Some(product_id) = product_id else {
            self.status.error(ErrorKind::Input, "No product selected");
            return Err(PlaybackError::NoProductLoaded);
        };

        self.status.info("Adding...");
        match self.cart.add_to_cart(&product_id).await {
            Ok(outcome) => {
                self.status.success("Added to cart!");
                self.emit(PlayerEvent::CartUpdated {
                    product_id: product_id.to_string(),
                    fragments: outcome.fragments.clone(),
                    cart_count: outcome.cart_count,
                });
                Ok(outcome)
            }
            Err(e) => {
                let err = PlaybackError::from(e);
                self.status.report(&err);
                Err(err)
            }
        }
    }

    /// Release the engine and drop every pending signal and delayed action.
    /// The loaded product stays in the session.
    pub fn shutdown(&self) {
        let paused = {
            let mut s = self.session.write();
            s.epoch += 1;
            s.ticket = None;
            s.pending_autoplay = false;
            s.transport = None;
            if s.state.is_settled() && s.state != PlayerState::Empty {
                s.state = PlayerState::Idle;
            }
            if std::mem::replace(&mut s.playing, false) {
                Some((
                    s.product_id().unwrap_or_default(),
                    s.current_index.unwrap_or(0),
                    to_millis(s.position),
                ))
            } else {
                None
            }
        };
        self.backends.release();
        if let Some((product_id, index, position_ms)) = paused {
            self.emit(PlayerEvent::Paused {
                product_id,
                index,
                position_ms,
            });
        }
        info!("Player controller shut down");
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn emit(&self, event: PlayerEvent) {
        self.events.emit(CoreEvent::Player(event)).ok();
    }

    fn observers(&self) -> Vec<Arc<dyn PlayerObserver>> {
        self.observers.read().clone()
    }

    fn notify_state(&self, state: PlayerState, playing: bool) {
        self.emit(PlayerEvent::StateChanged {
            state: state.to_string(),
            playing,
        });
        for observer in self.observers() {
            observer.on_state_changed(state, playing);
        }
    }

    fn notify_rendered(&self, product: &Product, tracks: &[Track]) {
        for observer in self.observers() {
            observer.on_rendered(product, tracks);
        }
    }

    fn is_compact(&self) -> bool {
        self.layout
            .read()
            .as_ref()
            .map(|l| l.is_compact())
            .unwrap_or(false)
    }
}

/// State to return to when a fetch fails, read from the live session so that
/// signals delivered during the fetch count.
fn restore_state(session: &PlaybackSession) -> PlayerState {
    if session.product.is_none() {
        PlayerState::Empty
    } else if session.playing {
        PlayerState::Playing
    } else if session.ticket.is_some() && !session.media_ready {
        PlayerState::TrackReady
    } else {
        PlayerState::Idle
    }
}
