//! Task spawning abstractions.
//!
//! ## Native (Tokio)
//! - `spawn` returns a `JoinHandle<T>`; the future must be `Send`.
//!
//! ## WASM
//! - `spawn` schedules the future on the browser event loop via
//!   `spawn_local`. Futures need not be `Send` and the call is
//!   fire-and-forget, matching how the player service drives its loop.

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{yield_now, JoinHandle};

#[cfg(not(target_arch = "wasm32"))]
/// Spawns a new asynchronous task on the current Tokio runtime.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
/// Schedules a future on the browser event loop.
pub fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(target_arch = "wasm32")]
/// Yields control back to the browser event loop once.
pub async fn yield_now() {
    gloo_timers::future::TimeoutFuture::new(0).await;
}
