//! WooCommerce add-to-cart client.

use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::PlayerConfig;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::models::ProductId;
use crate::wire::{CartPayload, Scalar};

/// What the shop returned after accepting the item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartOutcome {
    /// Replacement markup keyed by CSS selector (mini-cart, counters).
    pub fragments: BTreeMap<String, String>,
    pub cart_count: Option<u32>,
    pub cart_hash: Option<String>,
}

pub struct CartClient {
    http_client: Arc<dyn HttpClient>,
    cart_url: String,
    timeout: Duration,
}

impl CartClient {
    pub fn new(http_client: Arc<dyn HttpClient>, cart_url: impl Into<String>) -> Self {
        Self {
            http_client,
            cart_url: cart_url.into(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            http_client: Arc::clone(&config.http_client),
            cart_url: config.cart_url.clone(),
            timeout: config.request_timeout,
        }
    }

    /// Add one unit of `product_id` to the cart.
    ///
    /// Every failure, transport included, is reported as `CatalogError::Cart`.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: &ProductId) -> Result<CartOutcome> {
        let form = [("product_id", product_id.as_str()), ("quantity", "1")];
        let request = HttpRequest::post(&self.cart_url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .map_err(|e| CatalogError::Cart(e.to_string()))?
            .timeout(self.timeout);

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Add to cart request failed");
            CatalogError::Cart(format!("Network error: {}", e))
        })?;

        if !response.is_success() {
            return Err(CatalogError::Cart(format!("HTTP {}", response.status)));
        }

        let payload: CartPayload = response
            .json()
            .map_err(|e| CatalogError::Cart(format!("Unexpected response: {}", e)))?;

        if let Some(error) = payload.error.as_ref().filter(|e| e.truthy()) {
            let message = match error {
                Scalar::Text(text) if text != "1" && text != "true" => text.clone(),
                _ => payload
                    .message
                    .clone()
                    .unwrap_or_else(|| "The product could not be added".to_string()),
            };
            warn!(%message, "Shop rejected add to cart");
            return Err(CatalogError::Cart(message));
        }

        let fragments = payload
            .fragments
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(selector, markup)| match markup {
                Value::String(markup) => Some((selector, markup)),
                _ => None,
            })
            .collect();

        let outcome = CartOutcome {
            fragments,
            cart_count: payload.cart_count.as_ref().and_then(Scalar::positive_u32),
            cart_hash: payload.cart_hash.as_ref().and_then(Scalar::text),
        };

        info!(cart_count = ?outcome.cart_count, "Product added to cart");
        Ok(outcome)
    }
}
