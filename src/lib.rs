//! Workspace facade crate.
//!
//! Exposes feature flags that map to the individual workspace crates so a
//! host can depend on `vinyl-player-workspace` alone:
//!
//! - `desktop-shims` (default): the full player service with native bridges
//! - `wasm`: the full player service with browser bridges and the
//!   `startVinylPlayer` entry point
//! - `catalog-only`: the track data client and the playback controller,
//!   without the page layer

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service as service;

#[cfg(feature = "catalog-only")]
pub use core_catalog as catalog;

#[cfg(feature = "catalog-only")]
pub use core_playback as playback;
