//! # Player Configuration
//!
//! Builder-based configuration for the vinyl player core.
//!
//! ## Overview
//!
//! [`PlayerConfig`] collects the storefront endpoints, the waveform library
//! sources and visual parameters, timing constants and the HTTP bridge. The
//! builder validates everything up front so a misconfigured page fails with an
//! actionable message at startup rather than on the first click.
//!
//! ## Required Settings
//!
//! - `ajax_url` - absolute URL of the WordPress `admin-ajax.php` endpoint
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - desktop default: `bridge_desktop::ReqwestHttpClient` when
//!   the `desktop-shims` feature is enabled. Browser hosts must inject the
//!   fetch-based client from `bridge-wasm`.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::PlayerConfig;
//! use std::sync::Arc;
//!
//! let config = PlayerConfig::builder()
//!     .ajax_url("https://records.example/wp-admin/admin-ajax.php")
//!     .nonce("a1b2c3d4e5")
//!     .http_client(Arc::new(MyHttpClient))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::http::HttpClient;
use bridge_traits::media::WaveformStyle;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// AJAX action name registered by the storefront for track data.
pub const DEFAULT_TRACK_ACTION: &str = "yoyaku_player_v3_get_track";

/// Primary and secondary sources of the waveform library.
pub const DEFAULT_WAVEFORM_SOURCES: [&str; 2] = [
    "https://unpkg.com/wavesurfer.js@7.8.0/dist/wavesurfer.umd.min.js",
    "https://cdn.jsdelivr.net/npm/wavesurfer.js@7/dist/wavesurfer.min.js",
];

/// WooCommerce AJAX add-to-cart path, resolved against the site root.
pub const CART_ENDPOINT_PATH: &str = "/?wc-ajax=add_to_cart";

/// Configuration for the vinyl player core.
///
/// Use [`PlayerConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct PlayerConfig {
    /// Absolute URL of `admin-ajax.php`
    pub ajax_url: String,

    /// AJAX action that returns track data
    pub track_action: String,

    /// Anti-forgery token sent with every track request
    pub nonce: String,

    /// Absolute URL of the add-to-cart endpoint
    pub cart_url: String,

    /// Waveform library sources, tried in order
    pub waveform_sources: Vec<String>,

    /// CSS selector of the waveform container
    pub waveform_container: String,

    /// Fixed waveform visual parameters
    pub waveform_style: WaveformStyle,

    /// Pause before loading the next product after the last track
    pub settle_delay: Duration,

    /// Pause between a `ready` signal and the autoplay attempt
    pub autoplay_delay: Duration,

    /// How long status messages stay visible
    pub status_dismiss_after: Duration,

    /// Initial volume in percent
    pub initial_volume: u8,

    /// Playback-rate change per pitch step, in percent
    pub pitch_step_percent: u8,

    /// Largest pitch step in either direction
    pub max_pitch_steps: i32,

    /// Viewport width at or below which the compact layout is used
    pub compact_breakpoint_px: u32,

    /// Event bus capacity
    pub event_buffer: usize,

    /// Timeout applied to storefront requests
    pub request_timeout: Duration,

    /// HTTP client for storefront requests
    pub http_client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PlayerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerConfig")
            .field("ajax_url", &self.ajax_url)
            .field("track_action", &self.track_action)
            .field("nonce", &crate::logging::redact_if_sensitive("nonce", &self.nonce))
            .field("cart_url", &self.cart_url)
            .field("waveform_sources", &self.waveform_sources)
            .field("waveform_container", &self.waveform_container)
            .field("waveform_style", &self.waveform_style)
            .field("settle_delay", &self.settle_delay)
            .field("autoplay_delay", &self.autoplay_delay)
            .field("status_dismiss_after", &self.status_dismiss_after)
            .field("initial_volume", &self.initial_volume)
            .field("pitch_step_percent", &self.pitch_step_percent)
            .field("max_pitch_steps", &self.max_pitch_steps)
            .field("compact_breakpoint_px", &self.compact_breakpoint_px)
            .field("event_buffer", &self.event_buffer)
            .field("request_timeout", &self.request_timeout)
            .field("http_client", &"HttpClient { ... }")
            .finish()
    }
}

impl PlayerConfig {
    /// Creates a new builder for constructing a `PlayerConfig`.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Endpoint URLs are absolute http(s) URLs
    /// - At least one waveform source is configured
    /// - Volume, pitch and timing values are in range
    pub fn validate(&self) -> Result<()> {
        validate_endpoint("ajax_url", &self.ajax_url)?;
        validate_endpoint("cart_url", &self.cart_url)?;

        if self.track_action.trim().is_empty() {
            return Err(Error::Config("Track action cannot be empty".to_string()));
        }

        if self.waveform_sources.is_empty() {
            return Err(Error::Config(
                "At least one waveform library source is required. \
                 Use .waveform_sources() or keep the defaults."
                    .to_string(),
            ));
        }

        if self.waveform_sources.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::Config(
                "Waveform library sources cannot be empty strings".to_string(),
            ));
        }

        if self.waveform_container.trim().is_empty() {
            return Err(Error::Config(
                "Waveform container selector cannot be empty".to_string(),
            ));
        }

        if self.initial_volume > 100 {
            return Err(Error::Config(format!(
                "Initial volume {} exceeds 100%",
                self.initial_volume
            )));
        }

        if !(1..=20).contains(&self.pitch_step_percent) {
            return Err(Error::Config(format!(
                "Pitch step of {}% is outside the supported 1-20% range",
                self.pitch_step_percent
            )));
        }

        if self.max_pitch_steps < 1 {
            return Err(Error::Config(
                "Maximum pitch steps must be at least 1".to_string(),
            ));
        }

        let slowest = 100 - i64::from(self.pitch_step_percent) * i64::from(self.max_pitch_steps);
        if slowest <= 0 {
            return Err(Error::Config(format!(
                "{} pitch steps of {}% would stop playback entirely",
                self.max_pitch_steps, self.pitch_step_percent
            )));
        }

        if self.settle_delay > Duration::from_secs(60) {
            return Err(Error::Config(
                "Settle delay exceeds maximum of 60 seconds".to_string(),
            ));
        }

        if self.status_dismiss_after.is_zero() {
            return Err(Error::Config(
                "Status dismiss delay must be greater than zero".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer must hold at least one event".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_endpoint(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| {
        Error::Config(format!("{} must be an absolute URL ({}): {}", field, e, value))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}

/// Derive the add-to-cart URL from the AJAX endpoint's origin.
fn default_cart_url(ajax_url: &str) -> Result<String> {
    let base = Url::parse(ajax_url).map_err(|e| {
        Error::Config(format!("ajax_url must be an absolute URL ({}): {}", e, ajax_url))
    })?;
    base.join(CART_ENDPOINT_PATH)
        .map(|url| url.to_string())
        .map_err(|e| Error::Config(format!("Cannot derive cart URL: {}", e)))
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Web: inject bridge_wasm::WasmHttpClient."
            .to_string(),
    }
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(all(feature = "desktop-shims", target_arch = "wasm32"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "Browser builds must inject bridge_wasm::WasmHttpClient.".to_string(),
    })
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`PlayerConfig`] instances.
#[derive(Default)]
pub struct PlayerConfigBuilder {
    ajax_url: Option<String>,
    track_action: Option<String>,
    nonce: Option<String>,
    cart_url: Option<String>,
    waveform_sources: Option<Vec<String>>,
    waveform_container: Option<String>,
    waveform_style: Option<WaveformStyle>,
    settle_delay: Option<Duration>,
    autoplay_delay: Option<Duration>,
    status_dismiss_after: Option<Duration>,
    initial_volume: Option<u8>,
    pitch_step_percent: Option<u8>,
    max_pitch_steps: Option<i32>,
    compact_breakpoint_px: Option<u32>,
    event_buffer: Option<usize>,
    request_timeout: Option<Duration>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl PlayerConfigBuilder {
    /// Sets the absolute URL of `admin-ajax.php` (required).
    pub fn ajax_url(mut self, url: impl Into<String>) -> Self {
        self.ajax_url = Some(url.into());
        self
    }

    /// Overrides the AJAX action name used for track data.
    pub fn track_action(mut self, action: impl Into<String>) -> Self {
        self.track_action = Some(action.into());
        self
    }

    /// Sets the anti-forgery token printed by the storefront.
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Overrides the add-to-cart URL. Defaults to `?wc-ajax=add_to_cart` on
    /// the AJAX endpoint's origin.
    pub fn cart_url(mut self, url: impl Into<String>) -> Self {
        self.cart_url = Some(url.into());
        self
    }

    /// Replaces the waveform library sources (primary first).
    pub fn waveform_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.waveform_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn waveform_container(mut self, selector: impl Into<String>) -> Self {
        self.waveform_container = Some(selector.into());
        self
    }

    pub fn waveform_style(mut self, style: WaveformStyle) -> Self {
        self.waveform_style = Some(style);
        self
    }

    /// Pause before cross-product advance. Default: 2000 ms.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    /// Pause between `ready` and the autoplay attempt. Default: 200 ms.
    pub fn autoplay_delay(mut self, delay: Duration) -> Self {
        self.autoplay_delay = Some(delay);
        self
    }

    /// Status message lifetime. Default: 2500 ms.
    pub fn status_dismiss_after(mut self, delay: Duration) -> Self {
        self.status_dismiss_after = Some(delay);
        self
    }

    /// Initial volume in percent. Default: 80.
    pub fn initial_volume(mut self, percent: u8) -> Self {
        self.initial_volume = Some(percent);
        self
    }

    /// Playback-rate change per pitch step in percent. Default: 6.
    pub fn pitch_step_percent(mut self, percent: u8) -> Self {
        self.pitch_step_percent = Some(percent);
        self
    }

    /// Largest pitch step in either direction. Default: 8.
    pub fn max_pitch_steps(mut self, steps: i32) -> Self {
        self.max_pitch_steps = Some(steps);
        self
    }

    /// Compact layout breakpoint. Default: 768 px.
    pub fn compact_breakpoint_px(mut self, width: u32) -> Self {
        self.compact_breakpoint_px = Some(width);
        self
    }

    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Timeout for storefront requests. Default: 15 s.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the final `PlayerConfig` instance.
    ///
    /// # Errors
    ///
    /// - `Error::Config` when `ajax_url` is missing or a value is out of range
    /// - `Error::CapabilityMissing` when no HTTP client is available
    pub fn build(self) -> Result<PlayerConfig> {
        let ajax_url = self.ajax_url.ok_or_else(|| {
            Error::Config("AJAX URL is required. Use .ajax_url() to set it.".to_string())
        })?;

        let cart_url = match self.cart_url {
            Some(url) => url,
            None => default_cart_url(&ajax_url)?,
        };

        let request_timeout = self.request_timeout.unwrap_or(Duration::from_secs(15));

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let config = PlayerConfig {
            ajax_url,
            track_action: self
                .track_action
                .unwrap_or_else(|| DEFAULT_TRACK_ACTION.to_string()),
            nonce: self.nonce.unwrap_or_default(),
            cart_url,
            waveform_sources: self.waveform_sources.unwrap_or_else(|| {
                DEFAULT_WAVEFORM_SOURCES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            waveform_container: self
                .waveform_container
                .unwrap_or_else(|| "#waveform".to_string()),
            waveform_style: self.waveform_style.unwrap_or_default(),
            settle_delay: self.settle_delay.unwrap_or(Duration::from_millis(2000)),
            autoplay_delay: self.autoplay_delay.unwrap_or(Duration::from_millis(200)),
            status_dismiss_after: self
                .status_dismiss_after
                .unwrap_or(Duration::from_millis(2500)),
            initial_volume: self.initial_volume.unwrap_or(80),
            pitch_step_percent: self.pitch_step_percent.unwrap_or(6),
            max_pitch_steps: self.max_pitch_steps.unwrap_or(8),
            compact_breakpoint_px: self.compact_breakpoint_px.unwrap_or(768),
            event_buffer: self
                .event_buffer
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
            request_timeout,
            http_client,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const AJAX: &str = "https://records.example/wp-admin/admin-ajax.php";

    fn builder() -> PlayerConfigBuilder {
        PlayerConfig::builder()
            .ajax_url(AJAX)
            .http_client(Arc::new(MockHttpClient::new()))
    }

    #[test]
    fn test_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.track_action, DEFAULT_TRACK_ACTION);
        assert_eq!(config.nonce, "");
        assert_eq!(
            config.cart_url,
            "https://records.example/?wc-ajax=add_to_cart"
        );
        assert_eq!(config.waveform_sources.len(), 2);
        assert!(config.waveform_sources[0].contains("unpkg.com/wavesurfer.js@7.8.0"));
        assert!(config.waveform_sources[1].contains("cdn.jsdelivr.net"));
        assert_eq!(config.settle_delay, Duration::from_millis(2000));
        assert_eq!(config.autoplay_delay, Duration::from_millis(200));
        assert_eq!(config.status_dismiss_after, Duration::from_millis(2500));
        assert_eq!(config.initial_volume, 80);
        assert_eq!(config.pitch_step_percent, 6);
        assert_eq!(config.max_pitch_steps, 8);
        assert_eq!(config.compact_breakpoint_px, 768);
    }

    #[test]
    fn test_missing_ajax_url() {
        let result = PlayerConfig::builder()
            .http_client(Arc::new(MockHttpClient::new()))
            .build();

        match result {
            Err(Error::Config(message)) => assert!(message.contains(".ajax_url()")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_relative_ajax_url_rejected() {
        let result = PlayerConfig::builder()
            .ajax_url("/wp-admin/admin-ajax.php")
            .http_client(Arc::new(MockHttpClient::new()))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_explicit_cart_url_is_kept() {
        let config = builder()
            .cart_url("https://cart.example/?wc-ajax=add_to_cart")
            .build()
            .unwrap();
        assert_eq!(config.cart_url, "https://cart.example/?wc-ajax=add_to_cart");
    }

    #[test]
    fn test_volume_over_100_rejected() {
        assert!(matches!(
            builder().initial_volume(120).build(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_pitch_range_that_stops_playback_rejected() {
        assert!(matches!(
            builder().pitch_step_percent(20).max_pitch_steps(5).build(),
            Err(Error::Config(_))
        ));
        assert!(builder().pitch_step_percent(10).max_pitch_steps(8).build().is_ok());
    }

    #[test]
    fn test_empty_waveform_sources_rejected() {
        let result = builder().waveform_sources(Vec::<String>::new()).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_long_settle_delay_rejected() {
        let result = builder().settle_delay(Duration::from_secs(120)).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_output_redacts_nonce() {
        let config = builder().nonce("deadbeef42").build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("deadbeef42"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_is_capability_error() {
        let result = PlayerConfig::builder().ajax_url(AJAX).build();
        assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
    }
}
