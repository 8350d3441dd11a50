//! # Playback Error Types
//!
//! Errors raised by the player controller and its backends. Every variant maps
//! onto the shared [`ErrorKind`] taxonomy so status messages and events carry
//! the same classification as track-data failures.

use bridge_traits::error::BridgeError;
use core_catalog::{CatalogError, ErrorKind};
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// A caller passed an unusable value (non-finite seek, bad geometry).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport request while nothing is loaded.
    #[error("No product loaded")]
    NoProductLoaded,

    // ========================================================================
    // Track Data Errors
    // ========================================================================
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// Neither backend could be constructed for the media URL.
    #[error("Backend failed to load: {0}")]
    BackendLoad(String),

    /// Decode or runtime failure reported by the active engine.
    #[error("Backend runtime error: {0}")]
    BackendRuntime(String),

    /// The host refused to start or pause playback.
    #[error("Transport rejected: {0}")]
    TransportRejected(String),

    /// The current track failed twice in a row and needs an explicit reload.
    #[error("Playback disabled for this track")]
    PlaybackDisabled,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Classification used for status messages and events.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::InvalidInput(_) | PlaybackError::NoProductLoaded => ErrorKind::Input,
            PlaybackError::Catalog(e) => e.kind(),
            PlaybackError::BackendLoad(_) => ErrorKind::BackendLoad,
            PlaybackError::BackendRuntime(_) | PlaybackError::PlaybackDisabled => {
                ErrorKind::BackendRuntime
            }
            PlaybackError::TransportRejected(_) => ErrorKind::TransportRejection,
            PlaybackError::Bridge(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the user can simply try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network | ErrorKind::TransportRejection | ErrorKind::Cart
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_keep_their_kind() {
        let err = PlaybackError::from(CatalogError::ProductNotFound("gone".into()));
        assert_eq!(err.kind(), ErrorKind::ProductNotFound);
        assert_eq!(err.to_string(), CatalogError::ProductNotFound("gone".into()).to_string());
    }

    #[test]
    fn transport_and_network_are_recoverable() {
        assert!(PlaybackError::TransportRejected("NotAllowedError".into()).is_recoverable());
        assert!(PlaybackError::from(CatalogError::Network("offline".into())).is_recoverable());
        assert!(!PlaybackError::PlaybackDisabled.is_recoverable());
        assert_eq!(PlaybackError::PlaybackDisabled.kind(), ErrorKind::BackendRuntime);
    }
}
