//! Backend selection and the one-way downgrade to the plain engine.

use bridge_traits::media::{MediaElementFactory, WaveformLibrary, WaveformStyle};
use futures::channel::mpsc::UnboundedSender;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{PlainBackend, WaveformBackend};
use crate::error::Result;
use crate::traits::{BackendEvent, BackendKind, PlaybackBackend};

/// Where and how the waveform renders.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSettings {
    /// Script URLs for the library, tried in order.
    pub sources: Vec<String>,
    pub container: String,
    pub style: WaveformStyle,
}

/// Result of [`BackendSelector::acquire`].
pub struct AcquiredBackend {
    pub backend: Arc<dyn PlaybackBackend>,
    /// Set when this call downgraded to the plain backend.
    pub switched: Option<String>,
}

/// Owns the active backend.
///
/// The waveform library is loaded lazily on the first track. If every
/// source fails, or the waveform engine later fails at runtime, the selector
/// moves to the plain backend and never goes back.
pub struct BackendSelector {
    library: Option<Arc<dyn WaveformLibrary>>,
    factory: Arc<dyn MediaElementFactory>,
    settings: WaveformSettings,
    events: UnboundedSender<BackendEvent>,
    current: Mutex<Option<Arc<dyn PlaybackBackend>>>,
    downgraded: AtomicBool,
}

impl BackendSelector {
    /// Without a `library` the selector starts on the plain backend.
    pub fn new(
        library: Option<Arc<dyn WaveformLibrary>>,
        factory: Arc<dyn MediaElementFactory>,
        settings: WaveformSettings,
        events: UnboundedSender<BackendEvent>,
    ) -> Self {
        Self {
            library,
            factory,
            settings,
            events,
            current: Mutex::new(None),
            downgraded: AtomicBool::new(false),
        }
    }

    pub fn current(&self) -> Option<Arc<dyn PlaybackBackend>> {
        self.current.lock().clone()
    }

    pub fn current_kind(&self) -> Option<BackendKind> {
        self.current().map(|b| b.kind())
    }

    pub fn is_downgraded(&self) -> bool {
        self.downgraded.load(Ordering::Acquire)
    }

    /// The backend to load the next track with, creating it on first use.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<AcquiredBackend> {
        if let Some(backend) = self.current() {
            return Ok(AcquiredBackend {
                backend,
                switched: None,
            });
        }

        let library = match &self.library {
            Some(library) if !self.is_downgraded() => Arc::clone(library),
            _ => {
                return Ok(AcquiredBackend {
                    backend: self.install(self.plain()),
                    switched: None,
                })
            }
        };

        match self.ensure_library(library.as_ref()).await {
            Ok(()) => {
                let waveform: Arc<dyn PlaybackBackend> = Arc::new(WaveformBackend::new(
                    library,
                    self.settings.container.clone(),
                    self.settings.style.clone(),
                    self.events.clone(),
                ));
                Ok(AcquiredBackend {
                    backend: self.install(waveform),
                    switched: None,
                })
            }
            Err(reason) => {
                warn!(%reason, "Waveform library unavailable, using plain media backend");
                self.downgraded.store(true, Ordering::Release);
                Ok(AcquiredBackend {
                    backend: self.install(self.plain()),
                    switched: Some(reason),
                })
            }
        }
    }

    /// Replace a failing waveform backend with the plain one. Returns the
    /// new backend, or `None` when already on plain.
    pub fn downgrade(&self, reason: &str) -> Option<Arc<dyn PlaybackBackend>> {
        let previous = {
            let mut current = self.current.lock();
            if current.as_ref().map(|b| b.kind()) != Some(BackendKind::Waveform) {
                return None;
            }
            current.take()
        };
        if let Some(previous) = previous {
            previous.release();
        }

        warn!(%reason, "Downgrading to plain media backend");
        self.downgraded.store(true, Ordering::Release);
        Some(self.install(self.plain()))
    }

    /// Release the active engine, keeping the backend choice.
    pub fn release(&self) {
        if let Some(backend) = self.current() {
            backend.release();
        }
    }

    async fn ensure_library(&self, library: &dyn WaveformLibrary) -> std::result::Result<(), String> {
        if library.is_loaded() {
            return Ok(());
        }

        let mut last_error = String::from("no waveform sources configured");
        for source in &self.settings.sources {
            match library.load_from(source).await {
                Ok(()) => {
                    info!(%source, "Waveform library loaded");
                    return Ok(());
                }
                Err(e) => {
                    warn!(%source, error = %e, "Waveform library source failed");
                    last_error = e.to_string();
                }
            }
        }
        Err(last_error)
    }

    fn plain(&self) -> Arc<dyn PlaybackBackend> {
        Arc::new(PlainBackend::new(Arc::clone(&self.factory), self.events.clone()))
    }

    /// Store `backend` unless a concurrent acquire got there first.
    fn install(&self, backend: Arc<dyn PlaybackBackend>) -> Arc<dyn PlaybackBackend> {
        let mut current = self.current.lock();
        match current.as_ref() {
            Some(existing) if existing.kind() == backend.kind() => Arc::clone(existing),
            _ => {
                *current = Some(Arc::clone(&backend));
                backend
            }
        }
    }
}
