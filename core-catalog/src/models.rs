//! Domain models for products and their playlists.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, Result};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_LABEL: &str = "Unknown Label";
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

// =============================================================================
// ID Types
// =============================================================================

/// Storefront product identifier.
///
/// Opaque to the player. Empty values and `0` (what an unset PHP integer or
/// a blank data attribute turns into) are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if is_blank_id(trimmed) {
            return Err(CatalogError::InvalidProductId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Values the page uses to mean "no product".
pub fn is_blank_id(value: &str) -> bool {
    matches!(value.trim(), "" | "0" | "null" | "undefined" | "false")
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// =============================================================================
// Product & Track
// =============================================================================

/// A record as shown in the player. Replaced wholesale on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub artist: String,
    pub label: String,
    pub cover: Option<String>,
    pub sku: String,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub in_stock: Option<bool>,
}

impl Product {
    /// A product with placeholder metadata.
    pub fn placeholder(id: ProductId) -> Self {
        Self {
            sku: id.to_string(),
            id,
            title: UNKNOWN_PRODUCT.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            label: UNKNOWN_LABEL.to_string(),
            cover: None,
            price: None,
            currency: None,
            in_stock: None,
        }
    }
}

/// One playlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub url: String,
    pub bpm: Option<u32>,
    /// Display string as stored by the shop, e.g. `6:42`.
    pub duration: Option<String>,
    /// 1-based position in the stored playlist, gaps included.
    pub index: usize,
}

/// Result of a successful track-data fetch. `tracks` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithTracks {
    pub product: Product,
    pub tracks: Vec<Track>,
}
