//! User-facing status messages.
//!
//! Every message goes three ways: the event bus (for embedders), the status
//! surface (the transient line in the player) and `tracing`.

use bridge_traits::page::{StatusMessage, StatusSurface, StatusTone};
use core_catalog::ErrorKind;
use core_runtime::events::{CoreEvent, EventBus, StatusEvent, StatusLevel};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::PlaybackError;

pub struct StatusReporter {
    bus: EventBus,
    surface: RwLock<Option<Arc<dyn StatusSurface>>>,
    dismiss_after: Duration,
}

impl StatusReporter {
    pub fn new(bus: EventBus, dismiss_after: Duration) -> Self {
        Self {
            bus,
            surface: RwLock::new(None),
            dismiss_after,
        }
    }

    pub fn set_surface(&self, surface: Arc<dyn StatusSurface>) {
        *self.surface.write() = Some(surface);
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!(status = %message, "Status");
        self.publish(StatusLevel::Info, message, None);
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(status = %message, "Status");
        self.publish(StatusLevel::Success, message, None);
    }

    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) {
        let message = message.into();
        warn!(status = %message, kind = %kind, "Status");
        self.publish(StatusLevel::Error, message, Some(kind));
    }

    /// Show the standard message for `error`.
    pub fn report(&self, error: &PlaybackError) {
        warn!(error = %error, "Player operation failed");
        self.error(error.kind(), user_message(error));
    }

    fn publish(&self, level: StatusLevel, message: String, kind: Option<ErrorKind>) {
        let surface = self.surface.read().clone();
        if let Some(surface) = surface {
            let tone = match level {
                StatusLevel::Info => StatusTone::Info,
                StatusLevel::Success => StatusTone::Success,
                StatusLevel::Error => StatusTone::Error,
            };
            surface.show(&StatusMessage {
                tone,
                text: message.clone(),
                dismiss_after: self.dismiss_after,
            });
        }

        self.bus
            .emit(CoreEvent::Status(StatusEvent {
                level,
                message,
                kind: kind.map(|k| k.as_str().to_string()),
                dismiss_after_ms: self.dismiss_after.as_millis() as u64,
            }))
            .ok();
    }
}

/// Short text for the status line.
pub fn user_message(error: &PlaybackError) -> String {
    match error {
        PlaybackError::TransportRejected(detail) => format!("Play error: {}", detail),
        PlaybackError::PlaybackDisabled => "Playback unavailable for this track".to_string(),
        PlaybackError::NoProductLoaded => "No product selected".to_string(),
        other => match other.kind() {
            ErrorKind::Input => "Invalid product".to_string(),
            ErrorKind::Network => "Network error".to_string(),
            ErrorKind::InvalidResponse => "Error loading tracks".to_string(),
            ErrorKind::ProductNotFound => "Product not found".to_string(),
            ErrorKind::NoTracksAvailable => "No tracks available".to_string(),
            ErrorKind::BackendLoad | ErrorKind::BackendRuntime => {
                "Error loading audio".to_string()
            }
            ErrorKind::TransportRejection => "Play error".to_string(),
            ErrorKind::Cart => "Cart error".to_string(),
            ErrorKind::Internal => "Player error".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::CatalogError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<StatusMessage>>);

    impl StatusSurface for Recorder {
        fn show(&self, message: &StatusMessage) {
            self.0.lock().push(message.clone());
        }
    }

    #[test]
    fn error_reaches_bus_and_surface() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let reporter = StatusReporter::new(bus, Duration::from_millis(2500));
        let surface = Arc::new(Recorder::default());
        reporter.set_surface(surface.clone());

        reporter.report(&PlaybackError::from(CatalogError::NoTracksAvailable("7".into())));

        let shown = surface.0.lock();
        assert_eq!(shown[0].tone, StatusTone::Error);
        assert_eq!(shown[0].text, "No tracks available");
        assert_eq!(shown[0].dismiss_after, Duration::from_millis(2500));

        match rx.try_recv().unwrap() {
            CoreEvent::Status(event) => {
                assert_eq!(event.level, StatusLevel::Error);
                assert_eq!(event.kind.as_deref(), Some("no_tracks_available"));
                assert_eq!(event.dismiss_after_ms, 2500);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn transport_rejection_names_detail() {
        let err = PlaybackError::TransportRejected("NotAllowedError".into());
        assert_eq!(user_message(&err), "Play error: NotAllowedError");
    }
}
