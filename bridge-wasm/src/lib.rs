//! WebAssembly Bridge Implementations
//!
//! Browser adapters for the traits in `bridge-traits`, built on `web-sys`
//! and `wasm-bindgen`:
//!
//! - [`WasmHttpClient`]: `fetch` with abortable timeouts
//! - [`DomPageHost`]: trigger discovery, click interception, viewport facts
//! - [`DomPlayerSurface`] / [`DomStatusSurface`]: the player bar and status toast
//! - [`WaveSurferLibrary`] / [`WaveSurferEngine`]: CDN-loaded waveform engine
//! - [`Html5MediaFactory`] / [`Html5MediaElement`]: `<audio>` fallback
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to nothing on native targets.
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, init_console_logging, WasmBridgeConfig};
//!
//! init_console_logging(false);
//! let config = WasmBridgeConfig::from_js(settings)?;
//! let bridges = build_wasm_bridges(&config)?;
//! ```

#![cfg(target_arch = "wasm32")]

pub mod bootstrap;
pub mod console;
pub mod error;
pub mod http;
mod listener;
pub mod media;
pub mod page;
pub mod surface;
pub mod waveform;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use console::init_console_logging;
pub use error::{WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use media::{Html5MediaElement, Html5MediaFactory};
pub use page::DomPageHost;
pub use surface::{DomPlayerSurface, DomStatusSurface};
pub use waveform::{WaveSurferEngine, WaveSurferLibrary};
