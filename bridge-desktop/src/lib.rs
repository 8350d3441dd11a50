//! # Desktop Bridge Implementations
//!
//! Native implementations of bridge traits, used by command-line tooling and
//! integration tests that talk to a real storefront.
//!
//! - `HttpClient` using `reqwest`, one attempt per request
//!
//! Audio and page bridges only exist in the browser (`bridge-wasm`).
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let config = PlayerConfig::builder()
//!     .ajax_url("https://shop.example/wp-admin/admin-ajax.php")
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .build()?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
