//! # Page Binding
//!
//! Everything the player knows about the storefront page it lives in.
//!
//! - [`triggers`]: selector conventions and product-id extraction
//! - [`TriggerBinder`]: idempotent click binding and legacy-player hiding
//! - [`TriggerDirectory`]: page order of products, for auto-advance
//! - [`LayoutAdapter`]: compact/normal layout from viewport facts
//! - [`SurfaceObserver`]: controller callbacks rendered onto the player element

pub mod binder;
pub mod directory;
pub mod error;
pub mod layout;
pub mod surface;
pub mod triggers;

pub use binder::{PlayIntent, PlayRequest, ScanReport, TriggerBinder};
pub use directory::TriggerDirectory;
pub use error::{PageError, Result};
pub use layout::{DeviceProfile, LayoutAdapter, LayoutMode};
pub use surface::{product_view, SurfaceObserver};
pub use triggers::TriggerTarget;
