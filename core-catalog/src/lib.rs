//! # Core Catalog
//!
//! Storefront data access for the player: the Track Data Client that turns a
//! product id into metadata plus a playlist, and the add-to-cart client.
//!
//! Both clients speak classic WordPress form posts through the injected
//! [`HttpClient`](bridge_traits::http::HttpClient) and never touch shared
//! state. Response bodies are normalized in one place ([`wire`]) so the rest
//! of the player only sees [`Product`] and [`Track`].

pub mod cart;
pub mod client;
pub mod entities;
pub mod error;
pub mod models;
mod wire;

pub use cart::{CartClient, CartOutcome};
pub use client::TrackDataClient;
pub use entities::decode_entities;
pub use error::{CatalogError, ErrorKind, Result};
pub use models::{Product, ProductId, ProductWithTracks, Track};
