use bridge_traits::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure classes surfaced to the status line.
///
/// Shared by every player crate so status messages and tests can match on the
/// class of a failure without comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    Network,
    InvalidResponse,
    ProductNotFound,
    NoTracksAvailable,
    BackendLoad,
    BackendRuntime,
    TransportRejection,
    Cart,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Network => "network",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::ProductNotFound => "product_not_found",
            ErrorKind::NoTracksAvailable => "no_tracks_available",
            ErrorKind::BackendLoad => "backend_load",
            ErrorKind::BackendRuntime => "backend_runtime",
            ErrorKind::TransportRejection => "transport_rejection",
            ErrorKind::Cart => "cart",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Rejected locally, no request was made.
    #[error("Invalid product id: {0:?}")]
    InvalidProductId(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("No tracks available for product {0}")]
    NoTracksAvailable(String),

    #[error("Add to cart failed: {0}")]
    Cart(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidProductId(_) => ErrorKind::Input,
            CatalogError::Network(_) => ErrorKind::Network,
            CatalogError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            CatalogError::ProductNotFound(_) => ErrorKind::ProductNotFound,
            CatalogError::NoTracksAvailable(_) => ErrorKind::NoTracksAvailable,
            CatalogError::Cart(_) => ErrorKind::Cart,
        }
    }
}

impl From<BridgeError> for CatalogError {
    fn from(error: BridgeError) -> Self {
        CatalogError::Network(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            CatalogError::ProductNotFound("x".into()).kind(),
            ErrorKind::ProductNotFound
        );
        assert_eq!(CatalogError::Cart("x".into()).kind().as_str(), "cart");
        assert_eq!(
            CatalogError::from(BridgeError::OperationFailed("refused".into())).kind(),
            ErrorKind::Network
        );
    }
}
