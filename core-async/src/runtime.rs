//! Runtime utilities that abstract over the underlying async executor.
//!
//! Only native targets can block; the browser has a single event loop that
//! must never be parked, so the WASM build exposes `spawn_local` instead.

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a throwaway current-thread
/// runtime. Returns `None` when the runtime cannot be created.
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F>(future: F) -> Option<F::Output>
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .ok()
        .map(|runtime| runtime.block_on(future))
}

#[cfg(target_arch = "wasm32")]
pub use wasm_bindgen_futures::spawn_local;
