use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Player initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Player service is already running")]
    AlreadyRunning,

    #[error("Player service has stopped")]
    Stopped,

    #[error("Configuration error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Page error: {0}")]
    Page(#[from] core_page::PageError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
