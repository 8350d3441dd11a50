//! # Host Bridge Traits
//!
//! Capabilities the vinyl player core needs from its host, expressed as traits
//! so the same controller runs in the browser (`bridge-wasm`), on native hosts
//! (`bridge-desktop`) and against test doubles.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Form/JSON requests to the storefront endpoints
//!
//! ### Audio
//! - [`WaveformLibrary`](media::WaveformLibrary) - Runtime-loaded waveform library and engine constructor
//! - [`WaveformEngine`](media::WaveformEngine) - One waveform instance bound to a container
//! - [`MediaElementFactory`](media::MediaElementFactory) / [`MediaElement`](media::MediaElement) - Plain media fallback
//!
//! ### Page
//! - [`PageHost`](page::PageHost) - Trigger discovery, click interception, viewport facts
//! - [`PlayerSurface`](page::PlayerSurface) - The singleton player element
//! - [`StatusSurface`](page::StatusSurface) - Transient status line
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Browser  | `bridge-wasm`       |
//! | Desktop  | `bridge-desktop` (HTTP only) |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it and use `BridgeError::Rejected` when the host
//! explicitly refused an operation (for instance a blocked `play()`).
//!
//! ## Thread Safety
//!
//! Traits are bounded by [`PlatformSendSync`](platform::PlatformSendSync): `Send + Sync`
//! on native targets, unbounded on `wasm32` where everything runs on the
//! browser's event loop.

pub mod error;
pub mod http;
pub mod logging;
pub mod media;
pub mod page;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use media::{
    MediaElement, MediaElementFactory, MediaSignal, MediaSignalSink, WaveformEngine,
    WaveformLibrary, WaveformOptions, WaveformStyle,
};
pub use page::{
    ClickHandler, ControlAction, ControlHandler, ElementId, PageContext, PageElement, PageHost,
    PlayerSurface, ProductView, ResizeHandler, StatusMessage, StatusSurface, StatusTone,
    TrackView, Viewport,
};
