#![cfg(target_arch = "wasm32")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bridge_traits::media::WaveformLibrary;
use bridge_traits::page::{
    ControlAction, PageHost, PlayerSurface, ProductView, StatusMessage, StatusSurface, StatusTone,
    TrackView,
};
use bridge_wasm::surface::{PLAYER_ELEMENT_ID, STATUS_ELEMENT_ID};
use bridge_wasm::{
    DomPageHost, DomPlayerSurface, DomStatusSurface, WasmBridgeConfig, WaveSurferLibrary,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn fixture(html: &str) -> HtmlElement {
    let doc = document();
    let root = doc
        .create_element("div")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    root.set_inner_html(html);
    doc.body().unwrap().append_child(&root).unwrap();
    root
}

fn settings(json: &str) -> WasmBridgeConfig {
    WasmBridgeConfig::from_js(js_sys::JSON::parse(json).unwrap()).unwrap()
}

#[wasm_bindgen_test]
fn settings_accept_storefront_field_names() {
    let config = settings(
        r#"{"ajax_url":"https://shop.test/wp-admin/admin-ajax.php","nonce":"n1",
            "wc_ajax_url":"/?wc-ajax=add_to_cart","current_product_id":4521}"#,
    );
    assert_eq!(config.product_id.as_deref(), Some("4521"));
    assert_eq!(
        config.cart_url.as_deref(),
        Some("https://shop.test/?wc-ajax=add_to_cart")
    );
    assert_eq!(config.waveform_container, "#waveform");
    assert!(!config.debug);
}

#[wasm_bindgen_test]
fn settings_treat_false_and_zero_as_no_product() {
    let off_product = settings(r#"{"ajax_url":"https://shop.test/a","current_product_id":false}"#);
    assert_eq!(off_product.product_id, None);

    let zero = settings(r#"{"ajax_url":"https://shop.test/a","current_product_id":"0"}"#);
    assert_eq!(zero.product_id, None);
}

#[wasm_bindgen_test]
fn settings_without_ajax_url_are_rejected() {
    let raw = js_sys::JSON::parse(r#"{"nonce":"n1"}"#).unwrap();
    assert!(WasmBridgeConfig::from_js(raw).is_err());
}

#[wasm_bindgen_test]
fn rescans_keep_element_ids() {
    let root = fixture(
        r#"<a class="fwaplay rescan-probe" data-product="12" href="/p/12">Play</a>
           <a class="fwaplay rescan-probe" data-product="13" href="/p/13">Play</a>"#,
    );
    let host = DomPageHost::new(None).unwrap();

    let first = host.query(".rescan-probe").unwrap();
    let second = host.query(".rescan-probe").unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, second[0].id);
    assert_ne!(first[0].id, first[1].id);
    assert_eq!(first[0].attr("data-product"), Some("12"));
    assert!(first[0].has_class("fwaplay"));
    assert_eq!(first[0].tag, "a");
    assert_eq!(first[0].text, "Play");
    root.remove();
}

#[wasm_bindgen_test]
fn bound_click_cancels_navigation() {
    let root = fixture(r#"<a class="click-probe" href="/cart">Play</a>"#);
    let host = DomPageHost::new(None).unwrap();
    let element = host.query(".click-probe").unwrap().remove(0);

    let clicks = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&clicks);
    host.bind_click(element.id, Arc::new(move || *counter.lock().unwrap() += 1))
        .unwrap();

    let anchor = root
        .query_selector(".click-probe")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    anchor.click();

    assert_eq!(*clicks.lock().unwrap(), 1);
    root.remove();
}

#[wasm_bindgen_test]
fn hide_counts_matches() {
    let root = fixture(
        r#"<div class="legacy-probe">one</div><div class="legacy-probe">two</div>"#,
    );
    let host = DomPageHost::new(None).unwrap();

    assert_eq!(host.hide(".legacy-probe").unwrap(), 2);
    let first = root
        .query_selector(".legacy-probe")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    assert_eq!(first.style().get_property_value("display").unwrap(), "none");
    root.remove();
}

#[wasm_bindgen_test]
fn page_context_reads_cart_form_and_meta() {
    let root = fixture(
        r#"<form class="cart"><button name="add-to-cart" value="777">Buy</button></form>
           <meta property="product:id" content="778">"#,
    );
    let host = DomPageHost::new(Some("779".into())).unwrap();

    let context = host.page_context();
    assert_eq!(context.localized_product_id.as_deref(), Some("779"));
    assert_eq!(context.add_to_cart_value.as_deref(), Some("777"));
    assert_eq!(context.meta_product_id.as_deref(), Some("778"));
    root.remove();
}

fn sample_view() -> ProductView {
    ProductView {
        product_id: "42".into(),
        title: "Deep Cuts".into(),
        artist: "Various".into(),
        label: "Yoyaku".into(),
        cover: Some("https://shop.test/cover.jpg".into()),
        sku: "YYK001".into(),
        tracks: vec![
            TrackView {
                name: "A1 Opening".into(),
                bpm: Some(124),
                duration: None,
            },
            TrackView {
                name: "A2 <b>Closer</b>".into(),
                bpm: None,
                duration: Some("5:10".into()),
            },
        ],
    }
}

#[wasm_bindgen_test]
fn surface_renders_product_as_text() {
    let surface = DomPlayerSurface::new().unwrap();
    surface.mount().unwrap();
    surface.mount().unwrap();
    surface.render_product(&sample_view()).unwrap();
    surface.highlight_track(1, "A2 <b>Closer</b>");

    let doc = document();
    assert_eq!(
        doc.query_selector_all(&format!("#{PLAYER_ELEMENT_ID}"))
            .unwrap()
            .length(),
        1
    );
    let player = doc.get_element_by_id(PLAYER_ELEMENT_ID).unwrap();
    let items = player.query_selector_all(".playlist-item").unwrap();
    assert_eq!(items.length(), 2);

    let title = player.query_selector(".product-title").unwrap().unwrap();
    assert_eq!(title.text_content().as_deref(), Some("Deep Cuts"));
    let current = player.query_selector(".current-track").unwrap().unwrap();
    assert_eq!(current.text_content().as_deref(), Some("2 | A2 <b>Closer</b>"));
    assert!(player.query_selector("b").unwrap().is_none());
    let active = player.query_selector(".playlist-item.active").unwrap().unwrap();
    assert_eq!(active.get_attribute("data-index").as_deref(), Some("1"));
}

#[wasm_bindgen_test]
fn surface_controls_reach_the_handler() {
    let surface = DomPlayerSurface::new().unwrap();
    surface.mount().unwrap();
    surface.render_product(&sample_view()).unwrap();

    let actions = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&actions);
    surface.bind_controls(Arc::new(move |action| seen.lock().unwrap().push(action)));

    let player = document().get_element_by_id(PLAYER_ELEMENT_ID).unwrap();
    for selector in [".next", ".play-pause", ".pitch-up", ".playlist-item[data-index=\"1\"]"] {
        player
            .query_selector(selector)
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap()
            .click();
    }

    assert_eq!(
        *actions.lock().unwrap(),
        vec![
            ControlAction::Next,
            ControlAction::TogglePlayPause,
            ControlAction::AdjustPitch(1),
            ControlAction::SelectTrack(1),
        ]
    );
}

#[wasm_bindgen_test]
fn status_line_shows_latest_message() {
    let status = DomStatusSurface::new().unwrap();
    for text in ["Loading...", "Audio ready"] {
        status.show(&StatusMessage {
            tone: StatusTone::Success,
            text: text.into(),
            dismiss_after: Duration::from_millis(2500),
        });
    }

    let element = document().get_element_by_id(STATUS_ELEMENT_ID).unwrap();
    assert_eq!(element.text_content().as_deref(), Some("Audio ready"));
    assert!(element.class_list().contains("visible"));
    assert!(element.class_list().contains("status-success"));
}

#[wasm_bindgen_test]
async fn waveform_script_settles_on_its_load_event() {
    let library = WaveSurferLibrary::new().unwrap();
    assert!(!library.is_loaded());

    library
        .load_from("data:text/javascript,window.WaveSurfer=function(){};")
        .await
        .unwrap();

    assert!(library.is_loaded());
}
