//! Playback backends.
//!
//! Two adapters put the host engines behind [`PlaybackBackend`]:
//!
//! - [`WaveformBackend`]: the waveform visualization library, preferred.
//! - [`PlainBackend`]: a plain media element, used when the library cannot
//!   be loaded or fails at runtime.
//!
//! [`BackendSelector`] decides which one is active. The downgrade from
//! waveform to plain is one-way for the lifetime of the player.

mod plain;
mod selector;
mod waveform;

pub use plain::PlainBackend;
pub use selector::{AcquiredBackend, BackendSelector, WaveformSettings};
pub use waveform::{cache_busted, WaveformBackend};

use bridge_traits::error::BridgeError;
use bridge_traits::media::{MediaSignal, MediaSignalSink};
use futures::channel::mpsc::UnboundedSender;
use std::sync::Arc;

use crate::error::PlaybackError;
use crate::traits::{BackendEvent, BackendKind, LoadTicket};

/// Sink that tags every signal with `ticket` and forwards it to the
/// controller's event channel. Sends after the receiver is gone are dropped.
pub(crate) fn signal_sink(
    events: UnboundedSender<BackendEvent>,
    ticket: LoadTicket,
    backend: BackendKind,
) -> MediaSignalSink {
    Arc::new(move |signal: MediaSignal| {
        let _ = events.unbounded_send(BackendEvent {
            ticket,
            backend,
            signal,
        });
    })
}

/// Map a failed play/pause call.
pub(crate) fn transport_error(error: BridgeError) -> PlaybackError {
    match error {
        BridgeError::Rejected(reason) => PlaybackError::TransportRejected(reason),
        other => PlaybackError::TransportRejected(other.to_string()),
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
