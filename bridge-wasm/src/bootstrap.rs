//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! The storefront prints a settings object into the page (`ajax_url`,
//! `nonce`, `wc_ajax_url`, `current_product_id`, ...). [`WasmBridgeConfig`]
//! reads it and [`build_wasm_bridges`] constructs every browser adapter the
//! player needs, mirroring what `bridge-desktop` provides for native hosts.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult,
    http::HttpClient,
    media::{MediaElementFactory, WaveformLibrary},
    page::{PageHost, PlayerSurface, StatusSurface},
};
use serde::{Deserialize, Deserializer};
use wasm_bindgen::JsValue;

use crate::{
    error::{js_message, WasmError, WasmResult},
    http::WasmHttpClient,
    media::Html5MediaFactory,
    page::DomPageHost,
    surface::{DomPlayerSurface, DomStatusSurface},
    waveform::WaveSurferLibrary,
};

fn default_waveform_container() -> String {
    "#waveform".to_string()
}

/// Player settings as printed by the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct WasmBridgeConfig {
    /// Absolute URL of `admin-ajax.php`.
    pub ajax_url: String,
    #[serde(default)]
    pub nonce: String,
    /// Add-to-cart endpoint; derived from `ajax_url` when absent.
    #[serde(default, alias = "wc_ajax_url")]
    pub cart_url: Option<String>,
    /// Product of the current page, if the page is a product page.
    #[serde(
        default,
        alias = "current_product_id",
        deserialize_with = "deserialize_product_id"
    )]
    pub product_id: Option<String>,
    #[serde(default = "default_waveform_container")]
    pub waveform_container: String,
    /// Log at debug level in the console.
    #[serde(default)]
    pub debug: bool,
}

impl WasmBridgeConfig {
    /// Read the settings object handed to the entry point.
    ///
    /// A relative cart endpoint (WooCommerce prints `/?wc-ajax=add_to_cart`)
    /// is resolved against `ajax_url`.
    pub fn from_js(settings: JsValue) -> WasmResult<Self> {
        let mut config: Self = serde_wasm_bindgen::from_value(settings)
            .map_err(|e| WasmError::Settings(e.to_string()))?;
        if let Some(cart_url) = config.cart_url.take() {
            let resolved = web_sys::Url::new_with_base(&cart_url, &config.ajax_url)
                .map_err(|e| WasmError::Settings(format!("cart url: {}", js_message(&e))))?;
            config.cart_url = Some(resolved.href());
        }
        Ok(config)
    }
}

/// WordPress prints the id as a number, a string, or `false` off product
/// pages.
fn deserialize_product_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Float(f64),
        Text(String),
        Flag(bool),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(0)) | Some(RawId::Flag(_)) | None => None,
        Some(RawId::Number(id)) => Some(id.to_string()),
        Some(RawId::Float(id)) if id >= 1.0 && id.fract() == 0.0 => Some((id as u64).to_string()),
        Some(RawId::Float(_)) => None,
        Some(RawId::Text(text)) => {
            let text = text.trim();
            (!text.is_empty() && text != "0").then(|| text.to_string())
        }
    })
}

/// Fully constructed browser bridges ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// DOM trigger discovery, click interception and viewport facts.
    pub page: Arc<dyn PageHost>,
    /// The `#yoyaku-player` element.
    pub surface: Arc<dyn PlayerSurface>,
    /// The `#player-status` toast.
    pub status: Arc<dyn StatusSurface>,
    /// WaveSurfer.js loader and constructor.
    pub waveform_library: Arc<dyn WaveformLibrary>,
    /// `<audio>` fallback.
    pub media_factory: Arc<dyn MediaElementFactory>,
}

/// Build all browser bridges in one call.
pub fn build_wasm_bridges(config: &WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    Ok(WasmBridgeSet {
        http_client: Arc::new(WasmHttpClient::new()?),
        page: Arc::new(DomPageHost::new(config.product_id.clone())?),
        surface: Arc::new(DomPlayerSurface::new()?),
        status: Arc::new(DomStatusSurface::new()?),
        waveform_library: Arc::new(WaveSurferLibrary::new()?),
        media_factory: Arc::new(Html5MediaFactory::new()),
    })
}
