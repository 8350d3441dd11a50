//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the player crates:
//! - Player configuration with fail-fast validation
//! - Event bus carrying player and status events
//! - Logging and tracing setup
//!
//! ## Overview
//!
//! Every other core crate depends on this one for its configuration type and
//! for publishing events. It establishes the logging conventions used
//! throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, PlayerEvent, StatusEvent, StatusLevel};
