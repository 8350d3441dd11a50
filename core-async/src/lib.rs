//! Runtime-agnostic async helpers for the vinyl player core.
//!
//! The player runs inside a browser event loop in production and under Tokio
//! in tests and native tooling. Core crates depend on this crate instead of
//! reaching for either runtime directly:
//!
//! - Native platforms: re-exports from Tokio, so `#[tokio::test(start_paused = true)]`
//!   drives every timer the core creates.
//! - WebAssembly: `setTimeout`-backed timers from `gloo-timers` and
//!   `spawn_local` from `wasm-bindgen-futures`.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Sleep, durations, wall-clock milliseconds
//! - `runtime`: Blocking bridge used by the logging layer on native targets
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration};
//!
//! async fn settle() {
//!     sleep(Duration::from_millis(2000)).await;
//! }
//! ```

pub mod runtime;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration};
