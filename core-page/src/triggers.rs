//! Trigger conventions of the storefront markup.
//!
//! A trigger is any page element that should start playback of a product
//! when clicked. The themes in use mark them in several ways, so discovery
//! casts a wide net and extraction tries each convention in turn.

use bridge_traits::page::{PageContext, PageElement, PageHost};
use core_catalog::models::is_blank_id;
use core_catalog::ProductId;
use tracing::{debug, warn};
use url::Url;

/// Selectors that mark play triggers, in priority order.
pub const PLAY_TRIGGER_SELECTORS: [&str; 7] = [
    ".fwaplay",
    ".play-all",
    ".play-button",
    "[data-play]",
    "[href*=\"play\"]",
    "a.alltracks.fwap-play",
    "a.alltracks",
];

/// Product buttons whose document order defines "next product".
pub const PRODUCT_ORDER_SELECTOR: &str = ".fwap-play[data-product]";

/// Any element naming a product; the last-resort page fallback.
pub const ANY_PRODUCT_SELECTOR: &str = "[data-product]:not([data-product=\"0\"])";

/// Competing players left behind by older plugins.
pub const LEGACY_PLAYER_SELECTORS: [&str; 9] = [
    ".fwa-player",
    ".fwaplayer",
    ".audio-player",
    ".jp-audio",
    ".mejs-container",
    ".wp-audio-shortcode",
    ".jPlayer",
    ".audioplayer",
    ".html5-audio-player",
];

const PRODUCT_ATTRIBUTES: [&str; 3] = ["data-product", "data-product-id", "data-product_id"];
const PRODUCT_QUERY_KEYS: [&str; 3] = ["p", "product_id", "add-to-cart"];

/// One selector list for a single document-order query.
pub fn selector_list(selectors: &[&str]) -> String {
    selectors.join(", ")
}

/// What a trigger asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTarget {
    /// `None` when the element carries no usable id; the page context
    /// decides at click time.
    pub product_id: Option<ProductId>,
    /// 0-based track to start with.
    pub track_index: Option<usize>,
}

impl TriggerTarget {
    pub fn from_element(element: &PageElement) -> Self {
        let track_index = element
            .attr("data-track-index")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .or_else(|| {
                if element.has_class("alltracks") && !element.has_class("fwap-play") {
                    side_label_index(&element.text)
                } else {
                    None
                }
            });

        Self {
            product_id: product_id_from_element(element),
            track_index,
        }
    }
}

/// Product id from the element's attributes, then from its `href`.
pub fn product_id_from_element(element: &PageElement) -> Option<ProductId> {
    PRODUCT_ATTRIBUTES
        .iter()
        .filter_map(|name| element.attr(name))
        .find_map(|raw| ProductId::parse(raw).ok())
        .or_else(|| element.attr("href").and_then(product_id_from_href))
}

/// `...?p=<id>` (or `product_id=`, `add-to-cart=`), else a trailing numeric
/// path segment such as `/product/48213/`.
pub fn product_id_from_href(href: &str) -> Option<ProductId> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let base = Url::parse("https://page.invalid/").ok()?;
    let url = base.join(href).ok()?;

    let from_query = url.query_pairs().find_map(|(key, value)| {
        if PRODUCT_QUERY_KEYS.contains(&&*key) && value.chars().all(|c| c.is_ascii_digit()) {
            ProductId::parse(&value).ok()
        } else {
            None
        }
    });
    if from_query.is_some() {
        return from_query;
    }

    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .filter(|segment| segment.chars().all(|c| c.is_ascii_digit()))
        .and_then(|segment| ProductId::parse(segment).ok())
}

/// Track index for a vinyl side label such as `A2` or `B1` found in `text`.
///
/// Side A counts from 0; side B starts at index 2 (two tracks per side).
pub fn side_label_index(text: &str) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).find_map(|pair| {
        let number = pair[1].to_digit(10)? as usize;
        let offset = number.checked_sub(1)?;
        match pair[0] {
            'A' => Some(offset),
            'B' => Some(2 + offset),
            _ => None,
        }
    })
}

/// The page's own product, for triggers that name none.
///
/// Lookup order: the localized settings id, the `postid-<id>` body class,
/// the add-to-cart button, the product meta tag, then the first element on
/// the page that names a product. A localized id of `0` (archive and home
/// pages) skips straight to the first product on the page.
pub fn product_id_from_page(host: &dyn PageHost) -> Option<ProductId> {
    let context = host.page_context();

    if let Some(localized) = context.localized_product_id.as_deref() {
        if is_blank_id(localized) {
            debug!("Localized product id is blank, using first product on page");
            return first_product_on_page(host);
        }
        if let Ok(id) = ProductId::parse(localized) {
            return Some(id);
        }
    }

    product_id_from_context(&context).or_else(|| first_product_on_page(host))
}

fn product_id_from_context(context: &PageContext) -> Option<ProductId> {
    body_class_product_id(&context.body_class)
        .or_else(|| {
            context
                .add_to_cart_value
                .as_deref()
                .and_then(|v| ProductId::parse(v).ok())
        })
        .or_else(|| {
            context
                .meta_product_id
                .as_deref()
                .and_then(|v| ProductId::parse(v).ok())
        })
}

/// `postid-48213` among the body classes.
pub fn body_class_product_id(body_class: &str) -> Option<ProductId> {
    body_class.split_whitespace().find_map(|class| {
        let digits = class.strip_prefix("postid-")?;
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            ProductId::parse(digits).ok()
        } else {
            None
        }
    })
}

fn first_product_on_page(host: &dyn PageHost) -> Option<ProductId> {
    match host.query(ANY_PRODUCT_SELECTOR) {
        Ok(elements) => elements.iter().find_map(product_id_from_element),
        Err(e) => {
            warn!(error = %e, "Product lookup on page failed");
            None
        }
    }
}
