//! Track Data Client
//!
//! Fetches a product's metadata and playlist from the storefront's
//! `admin-ajax.php` handler. Stateless: every call is one form POST and the
//! caller decides what to do with the result.

use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::PlayerConfig;
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::models::{ProductId, ProductWithTracks};
use crate::wire::{Envelope, ProductPayload};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the track-data AJAX action.
///
/// # Example
///
/// ```ignore
/// let client = TrackDataClient::from_config(&config);
/// let loaded = client.fetch_track_data(&ProductId::parse("48213")?).await?;
/// println!("{} tracks", loaded.tracks.len());
/// ```
pub struct TrackDataClient {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    action: String,
    nonce: String,
    timeout: Duration,
}

impl TrackDataClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        endpoint: impl Into<String>,
        action: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            action: action.into(),
            nonce: nonce.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            config.ajax_url.clone(),
            config.track_action.clone(),
            config.nonce.clone(),
        )
        .with_timeout(config.request_timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate `raw` and fetch it. Blank ids fail without a request.
    pub async fn fetch(&self, raw: &str) -> Result<ProductWithTracks> {
        let product_id = ProductId::parse(raw)?;
        self.fetch_track_data(&product_id).await
    }

    /// Fetch metadata and playable tracks for `product_id`.
    ///
    /// # Errors
    ///
    /// - `Network` when no response arrived
    /// - `InvalidResponse` for non-2xx, non-JSON or envelope-less bodies
    /// - `ProductNotFound` when the shop answered `success: false`
    /// - `NoTracksAvailable` when no entry carried a media URL
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn fetch_track_data(&self, product_id: &ProductId) -> Result<ProductWithTracks> {
        debug!(
            action = %self.action,
            nonce = %redact_if_sensitive("nonce", &self.nonce),
            "Requesting track data"
        );

        let form = [
            ("action", self.action.as_str()),
            ("product_id", product_id.as_str()),
            ("nonce", self.nonce.as_str()),
        ];
        let request = HttpRequest::post(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?
            .timeout(self.timeout);

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Track data request failed");
            CatalogError::from(e)
        })?;

        if !response.is_success() {
            warn!(status = response.status, "Track data endpoint returned an error status");
            return Err(CatalogError::InvalidResponse(format!(
                "HTTP {}",
                response.status
            )));
        }

        let envelope: Envelope = response
            .json()
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        let Some(success) = envelope.success else {
            return Err(CatalogError::InvalidResponse(
                "Response has no success flag".to_string(),
            ));
        };

        if !success {
            let message = envelope
                .failure_message()
                .unwrap_or_else(|| format!("Product {} not found", product_id));
            info!(%message, "Storefront reported product as unavailable");
            return Err(CatalogError::ProductNotFound(message));
        }

        let data = envelope.data.ok_or_else(|| {
            CatalogError::InvalidResponse("Successful response carries no data".to_string())
        })?;

        let payload: ProductPayload = serde_json::from_value(data)
            .map_err(|e| CatalogError::InvalidResponse(format!("Malformed product data: {}", e)))?;

        let tracks = payload.tracks();
        if tracks.is_empty() {
            return Err(CatalogError::NoTracksAvailable(product_id.to_string()));
        }

        let product = payload.product(product_id);
        info!(title = %product.title, tracks = tracks.len(), "Track data loaded");

        Ok(ProductWithTracks { product, tracks })
    }
}
