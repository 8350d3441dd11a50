use thiserror::Error;

/// Errors raised while assembling the player runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// A `PlayerConfig` field failed validation, or logging could not start.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host did not provide a bridge the player cannot run without.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// A platform default (such as the native HTTP client) failed to build.
    #[error("Platform default unavailable: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
