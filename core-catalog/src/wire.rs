//! Response payloads of the storefront endpoints.
//!
//! The shop has shipped several generations of the AJAX handler, so every
//! field is optional and scalars may arrive as strings, numbers or booleans.
//! Normalization into [`crate::models`] happens here and nowhere else.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::entities::decode_entities;
use crate::models::{Product, ProductId, Track, UNKNOWN_ARTIST, UNKNOWN_LABEL, UNKNOWN_PRODUCT};

/// JSON scalar that PHP may have encoded as any primitive.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    /// Non-empty text form. `false` (PHP's "no value") yields `None`.
    pub(crate) fn text(&self) -> Option<String> {
        let text = match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Flag(true) => "1".to_string(),
            Scalar::Flag(false) => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    pub(crate) fn positive_u32(&self) -> Option<u32> {
        let value = match self {
            Scalar::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))?,
            Scalar::Text(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u64))?
            }
            Scalar::Flag(_) => return None,
        };
        u32::try_from(value).ok().filter(|v| *v > 0)
    }

    pub(crate) fn truthy(&self) -> bool {
        match self {
            Scalar::Text(s) => !matches!(s.trim(), "" | "0" | "false"),
            Scalar::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Scalar::Flag(b) => *b,
        }
    }
}

/// `{success, data, message}` as produced by `wp_send_json_*`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl Envelope {
    /// Best human-readable reason for a `success: false` response.
    pub(crate) fn failure_message(&self) -> Option<String> {
        fn as_text(value: &Value) -> Option<String> {
            value
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        }

        self.message
            .as_ref()
            .and_then(as_text)
            .or_else(|| self.data.as_ref().and_then(|d| d.get("message")).and_then(as_text))
            .or_else(|| self.data.as_ref().and_then(as_text))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductPayload {
    #[serde(default)]
    pub product_id: Option<Scalar>,
    #[serde(default)]
    pub title: Option<Scalar>,
    #[serde(default)]
    pub artist: Option<Scalar>,
    #[serde(default)]
    pub label: Option<Scalar>,
    #[serde(default)]
    pub cover: Option<Scalar>,
    #[serde(default)]
    pub sku: Option<Scalar>,
    #[serde(default)]
    pub price: Option<Scalar>,
    #[serde(default)]
    pub currency: Option<Scalar>,
    #[serde(default)]
    pub in_stock: Option<Scalar>,
    #[serde(default)]
    pub tracks: Option<Vec<Value>>,
}

impl ProductPayload {
    /// Metadata with defaults applied. `requested` stands in for a missing or
    /// unusable `product_id`.
    pub(crate) fn product(&self, requested: &ProductId) -> Product {
        let id = self
            .product_id
            .as_ref()
            .and_then(Scalar::text)
            .and_then(|raw| ProductId::parse(&raw).ok())
            .unwrap_or_else(|| requested.clone());

        let display = |field: &Option<Scalar>, fallback: &str| {
            field
                .as_ref()
                .and_then(Scalar::text)
                .map(|s| decode_entities(&s))
                .unwrap_or_else(|| fallback.to_string())
        };

        Product {
            title: display(&self.title, UNKNOWN_PRODUCT),
            artist: display(&self.artist, UNKNOWN_ARTIST),
            label: display(&self.label, UNKNOWN_LABEL),
            cover: self.cover.as_ref().and_then(Scalar::text),
            sku: self
                .sku
                .as_ref()
                .and_then(Scalar::text)
                .unwrap_or_else(|| id.to_string()),
            price: self.price.as_ref().and_then(Scalar::text),
            currency: self.currency.as_ref().and_then(Scalar::text),
            in_stock: self.in_stock.as_ref().map(Scalar::truthy),
            id,
        }
    }

    /// Playable tracks in server order.
    pub(crate) fn tracks(&self) -> Vec<Track> {
        self.tracks
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(position, entry)| {
                let payload: TrackPayload = serde_json::from_value(entry.clone()).ok()?;
                payload.normalize(position)
            })
            .collect()
    }
}

/// One track entry in any of the historical field conventions.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrackPayload {
    #[serde(default)]
    track_name: Option<Scalar>,
    #[serde(default)]
    track_file_url: Option<Scalar>,
    #[serde(default)]
    track_bpm: Option<Scalar>,
    #[serde(default)]
    track_duration: Option<Scalar>,
    #[serde(default)]
    name: Option<Scalar>,
    #[serde(default)]
    file: Option<Scalar>,
    #[serde(default)]
    url: Option<Scalar>,
    #[serde(default)]
    bpm: Option<Scalar>,
    #[serde(default)]
    duration: Option<Scalar>,
    #[serde(default)]
    index: Option<Scalar>,
}

impl TrackPayload {
    /// `None` when the entry has no media URL. A missing name becomes
    /// `Track N`.
    fn normalize(self, position: usize) -> Option<Track> {
        let text = |field: &Option<Scalar>| field.as_ref().and_then(Scalar::text);

        let (name, url, bpm, duration) = if let Some(url) = text(&self.track_file_url) {
            (text(&self.track_name), url, &self.track_bpm, &self.track_duration)
        } else if let Some(url) = text(&self.file) {
            (text(&self.name), url, &self.bpm, &self.duration)
        } else {
            (text(&self.name), text(&self.url)?, &self.bpm, &self.duration)
        };

        let index = self
            .index
            .as_ref()
            .and_then(Scalar::positive_u32)
            .map(|i| i as usize)
            .unwrap_or(position + 1);

        Some(Track {
            name: name
                .map(|n| decode_entities(&n))
                .unwrap_or_else(|| format!("Track {}", position + 1)),
            url,
            bpm: bpm.as_ref().and_then(Scalar::positive_u32),
            duration: duration.as_ref().and_then(Scalar::text),
            index,
        })
    }
}

/// WooCommerce `?wc-ajax=add_to_cart` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CartPayload {
    #[serde(default)]
    pub error: Option<Scalar>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub fragments: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub cart_count: Option<Scalar>,
    #[serde(default)]
    pub cart_hash: Option<Scalar>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> ProductPayload {
        serde_json::from_value(value).unwrap()
    }

    fn requested() -> ProductId {
        ProductId::parse("123").unwrap()
    }

    #[test]
    fn prefers_track_name_convention_when_both_present() {
        let data = payload(json!({
            "tracks": [{
                "track_name": "A1 Deep",
                "track_file_url": "https://cdn.test/a1.mp3",
                "track_bpm": "124",
                "name": "ignored",
                "file": "https://cdn.test/ignored.mp3",
                "bpm": 90
            }]
        }));

        let tracks = data.tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "A1 Deep");
        assert_eq!(tracks[0].url, "https://cdn.test/a1.mp3");
        assert_eq!(tracks[0].bpm, Some(124));
    }

    #[test]
    fn accepts_all_field_conventions() {
        let data = payload(json!({
            "tracks": [
                {"name": "A1", "file": "https://cdn.test/a1.mp3", "bpm": 122, "duration": "5:01"},
                {"name": "A2", "url": "https://cdn.test/a2.mp3", "bpm": null, "duration": null},
                {"track_name": "B1", "track_file_url": "https://cdn.test/b1.mp3", "track_duration": "6:10"}
            ]
        }));

        let tracks = data.tracks();
        let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["A1", "A2", "B1"]);
        assert_eq!(tracks[0].duration.as_deref(), Some("5:01"));
        assert_eq!(tracks[1].bpm, None);
        assert_eq!(tracks[2].index, 3);
    }

    #[test]
    fn drops_entries_without_media_url() {
        let data = payload(json!({
            "tracks": [
                {},
                {"name": "No file"},
                "garbage",
                {"url": "https://cdn.test/untitled.mp3"},
                {"name": "B2", "url": ""}
            ]
        }));

        let tracks = data.tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Track 4");
        assert_eq!(tracks[0].index, 4);
    }

    #[test]
    fn bpm_zero_or_garbage_is_none() {
        let data = payload(json!({
            "tracks": [
                {"name": "A", "url": "u1", "bpm": 0},
                {"name": "B", "url": "u2", "bpm": "fast"},
                {"name": "C", "url": "u3", "bpm": "128.0"}
            ]
        }));

        let bpms: Vec<_> = data.tracks().iter().map(|t| t.bpm).collect();
        assert_eq!(bpms, [None, None, Some(128)]);
    }

    #[test]
    fn product_defaults_and_entity_decoding() {
        let product = payload(json!({"title": "Drum &amp; Bass Vol.&#039;2", "cover": false}))
            .product(&requested());

        assert_eq!(product.id, requested());
        assert_eq!(product.title, "Drum & Bass Vol.'2");
        assert_eq!(product.artist, UNKNOWN_ARTIST);
        assert_eq!(product.label, UNKNOWN_LABEL);
        assert_eq!(product.cover, None);
        assert_eq!(product.sku, "123");
    }

    #[test]
    fn product_id_from_payload_wins_when_usable() {
        let product = payload(json!({"product_id": 456, "sku": "YOY-001", "in_stock": true, "price": "24.50"}))
            .product(&requested());
        assert_eq!(product.id.as_str(), "456");
        assert_eq!(product.sku, "YOY-001");
        assert_eq!(product.in_stock, Some(true));
        assert_eq!(product.price.as_deref(), Some("24.50"));

        let fallback = payload(json!({"product_id": 0})).product(&requested());
        assert_eq!(fallback.id, requested());
    }

    #[test]
    fn failure_message_lookup_order() {
        let top: Envelope =
            serde_json::from_value(json!({"success": false, "message": "not found"})).unwrap();
        assert_eq!(top.failure_message().as_deref(), Some("not found"));

        let nested: Envelope = serde_json::from_value(
            json!({"success": false, "data": {"message": "Product not found"}}),
        )
        .unwrap();
        assert_eq!(nested.failure_message().as_deref(), Some("Product not found"));

        let bare: Envelope =
            serde_json::from_value(json!({"success": false, "data": "Invalid nonce"})).unwrap();
        assert_eq!(bare.failure_message().as_deref(), Some("Invalid nonce"));
    }
}
