//! # Event Bus System
//!
//! Typed events published by the player core on a `tokio::sync::broadcast`
//! channel. Host adapters, analytics hooks and tests subscribe independently;
//! publishing never blocks the controller.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐   subscribe   ┌──────────────┐
//! │ PlayerController ├──────────>│           ├──────────────>│ Host adapter │
//! └──────────────────┘           │ EventBus  │               └──────────────┘
//! ┌──────────────────┐   emit    │           │   subscribe   ┌──────────────┐
//! │  StatusReporter  ├──────────>│           ├──────────────>│    Tests     │
//! └──────────────────┘           └───────────┘               └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(CoreEvent::Player(PlayerEvent::Completed {
//!     product_id: "1234".to_string(),
//!     index: 0,
//! }))
//! .ok();
//!
//! assert!(matches!(subscriber.recv().await, Ok(CoreEvent::Player(_))));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and can keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender was dropped; the player shut down.
//!
//! `emit` fails only when nobody is subscribed, which the core treats as a
//! normal condition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Progress events arrive several times per second while playing, so slow
/// subscribers will see `RecvError::Lagged` rather than stall the controller.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Player lifecycle events
    Player(PlayerEvent),
    /// User-facing status messages
    Status(StatusEvent),
}

// ============================================================================
// Player Events
// ============================================================================

/// Events describing what the player controller did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// Track data for a product was fetched and rendered.
    ProductLoaded {
        product_id: String,
        title: String,
        track_count: usize,
    },
    /// A different track became current.
    TrackChanged {
        product_id: String,
        index: usize,
        name: String,
    },
    /// The controller moved to another state.
    StateChanged {
        /// State name, e.g. `"Playing"`.
        state: String,
        playing: bool,
    },
    /// Playback actually started.
    Started { product_id: String, index: usize },
    /// Playback paused by the user.
    Paused {
        product_id: String,
        index: usize,
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// Periodic position update.
    Progress {
        position_ms: u64,
        duration_ms: Option<u64>,
        /// Pre-formatted `m:ss / m:ss`.
        label: String,
    },
    /// A track reached its natural end.
    Completed { product_id: String, index: usize },
    /// The engine was downgraded, e.g. from the waveform to the plain backend.
    BackendSwitched {
        from: String,
        to: String,
        reason: String,
    },
    /// The storefront accepted an add-to-cart request.
    CartUpdated {
        product_id: String,
        /// Markup fragments keyed by the selector they replace.
        fragments: BTreeMap<String, String>,
        cart_count: Option<u32>,
    },
    /// A failure the player could not recover from on its own.
    Error { message: String, recoverable: bool },
}

// ============================================================================
// Status Events
// ============================================================================

/// Tone of a user-facing status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// A transient message for the status line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEvent {
    pub level: StatusLevel,
    pub message: String,
    /// Error classification when `level` is `Error`, e.g. `"network"`.
    pub kind: Option<String>,
    pub dismiss_after_ms: u64,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus clones the sender, so every clone publishes into the same
/// channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> CoreEvent {
        CoreEvent::Player(PlayerEvent::Started {
            product_id: "1234".to_string(),
            index: 0,
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(started()).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(started()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), started());
        assert_eq!(sub2.recv().await.unwrap(), started());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Player(PlayerEvent::Progress {
                position_ms: i * 250,
                duration_ms: Some(180_000),
                label: "0:00 / 3:00".to_string(),
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_serialization_shape() {
        let json = serde_json::to_value(started()).unwrap();
        assert_eq!(json["type"], "Player");
        assert_eq!(json["payload"]["event"], "Started");
        assert_eq!(json["payload"]["product_id"], "1234");

        let back: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, started());
    }
}
