//! Track Data Client and cart client against a mocked HTTP bridge

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_catalog::{CartClient, CatalogError, ErrorKind, ProductId, TrackDataClient};
use mockall::mock;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

const AJAX: &str = "https://records.test/wp-admin/admin-ajax.php";

fn response(status: u16, body: impl Into<Bytes>) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: body.into(),
    }
}

fn json_response(value: Value) -> HttpResponse {
    response(200, serde_json::to_vec(&value).unwrap())
}

fn client_returning(value: Value) -> TrackDataClient {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .times(1)
        .returning(move |_| Ok(json_response(value.clone())));
    TrackDataClient::new(Arc::new(http), AJAX, "yoyaku_player_v3_get_track", "n0nce")
}

#[tokio::test]
async fn sends_action_product_and_nonce_as_form() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|request| {
            let fields = request.form_fields().unwrap_or_default();
            request.url == AJAX
                && fields.get("action").map(String::as_str) == Some("yoyaku_player_v3_get_track")
                && fields.get("product_id").map(String::as_str) == Some("123")
                && fields.get("nonce").map(String::as_str) == Some("n0nce")
        })
        .times(1)
        .returning(|_| {
            Ok(json_response(json!({
                "success": true,
                "data": {"tracks": [{"name": "A1", "url": "http://x/a1.mp3"}]}
            })))
        });

    let client = TrackDataClient::new(Arc::new(http), AJAX, "yoyaku_player_v3_get_track", "n0nce");
    let loaded = client.fetch("123").await.unwrap();

    assert_eq!(loaded.product.id.as_str(), "123");
    assert_eq!(loaded.tracks.len(), 1);
    assert_eq!(loaded.tracks[0].url, "http://x/a1.mp3");
}

#[tokio::test]
async fn blank_id_is_rejected_without_request() {
    let mut http = MockHttpClient::new();
    http.expect_execute().times(0);
    let client = TrackDataClient::new(Arc::new(http), AJAX, "get_track", "");

    for raw in ["", "0"] {
        let err = client.fetch(raw).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }
}

#[tokio::test]
async fn full_payload_is_normalized() {
    let client = client_returning(json!({
        "success": true,
        "data": {
            "product_id": 48213,
            "title": "Night &amp; Day EP",
            "artist": "Kyoto Jazz Massive",
            "label": "Especial",
            "cover": "https://records.test/cover.jpg",
            "sku": "ESP-042",
            "price": "18.00",
            "currency": "EUR",
            "in_stock": false,
            "tracks": [
                {"index": 1, "name": "A1", "url": "https://cdn.test/a1.mp3", "bpm": 122, "duration": "6:01"},
                {"index": 2, "name": "A2", "url": "https://cdn.test/a2.mp3", "bpm": null, "duration": null}
            ]
        }
    }));

    let loaded = client.fetch("48213").await.unwrap();
    let product = &loaded.product;
    assert_eq!(product.title, "Night & Day EP");
    assert_eq!(product.sku, "ESP-042");
    assert_eq!(product.cover.as_deref(), Some("https://records.test/cover.jpg"));
    assert_eq!(product.currency.as_deref(), Some("EUR"));
    assert_eq!(product.in_stock, Some(false));
    assert_eq!(loaded.tracks[0].bpm, Some(122));
    assert_eq!(loaded.tracks[1].duration, None);
}

#[tokio::test]
async fn success_false_is_product_not_found() {
    let client = client_returning(json!({"success": false, "message": "not found"}));
    let err = client.fetch("999").await.unwrap_err();
    assert_eq!(err, CatalogError::ProductNotFound("not found".to_string()));
}

#[tokio::test]
async fn all_malformed_tracks_is_no_tracks_available() {
    let client = client_returning(json!({
        "success": true,
        "data": {"title": "Broken", "tracks": [{}, {"name": "no url"}]}
    }));
    let err = client.fetch("5").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoTracksAvailable);
}

#[tokio::test]
async fn missing_tracks_is_no_tracks_available() {
    let client = client_returning(json!({"success": true, "data": {"title": "Empty"}}));
    let err = client.fetch("5").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoTracksAvailable);
}

#[tokio::test]
async fn non_json_and_error_status_are_invalid_response() {
    let mut http = MockHttpClient::new();
    let mut calls = 0;
    http.expect_execute().times(3).returning(move |_| {
        calls += 1;
        Ok(match calls {
            1 => response(200, "<html>Fatal error</html>"),
            2 => response(500, "{}"),
            _ => json_response(json!({"data": {}})),
        })
    });
    let client = TrackDataClient::new(Arc::new(http), AJAX, "get_track", "");

    for _ in 0..3 {
        let err = client.fetch("7").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }
}

#[tokio::test]
async fn transport_failure_is_network_error() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .returning(|_| Err(BridgeError::OperationFailed("Connection refused".into())));
    let client = TrackDataClient::new(Arc::new(http), AJAX, "get_track", "");

    let err = client.fetch("7").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn cart_success_returns_fragments_and_count() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|request| {
            let fields = request.form_fields().unwrap_or_default();
            fields.get("product_id").map(String::as_str) == Some("42")
                && fields.get("quantity").map(String::as_str) == Some("1")
        })
        .returning(|_| {
            Ok(json_response(json!({
                "fragments": {"div.widget_shopping_cart_content": "<div>1 item</div>", "ignored": 3},
                "cart_hash": "abc123",
                "cart_count": 3
            })))
        });

    let cart = CartClient::new(Arc::new(http), "https://records.test/?wc-ajax=add_to_cart");
    let outcome = cart.add_to_cart(&ProductId::parse("42").unwrap()).await.unwrap();

    assert_eq!(outcome.cart_count, Some(3));
    assert_eq!(outcome.fragments.len(), 1);
    assert_eq!(outcome.cart_hash.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn cart_error_flag_is_cart_error() {
    let mut http = MockHttpClient::new();
    http.expect_execute().times(2).returning({
        let mut calls = 0;
        move |_| {
            calls += 1;
            Ok(if calls == 1 {
                json_response(json!({"error": true, "product_url": "https://records.test/p/42"}))
            } else {
                json_response(json!({"error": "Sold out"}))
            })
        }
    });
    let cart = CartClient::new(Arc::new(http), "https://records.test/?wc-ajax=add_to_cart");
    let id = ProductId::parse("42").unwrap();

    let first = cart.add_to_cart(&id).await.unwrap_err();
    assert_eq!(first.kind(), ErrorKind::Cart);

    let second = cart.add_to_cart(&id).await.unwrap_err();
    assert_eq!(second, CatalogError::Cart("Sold out".to_string()));
}
