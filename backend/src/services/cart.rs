//! Cart operations. Every function returns a new cart; totals are always
//! recomputed from the items.

use std::collections::HashSet;

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

use crate::models::cart::{Cart, CartItem};

/// Most distinct courses a cart cookie may carry; extra entries are dropped.
pub const MAX_CART_ITEMS: usize = 50;

/// Adds one seat of a course. Adding a course already in the cart is a no-op.
pub fn add_to_cart(cart: &Cart, item: CartItem) -> Cart {
    if cart.contains(item.course_id) {
        return Cart::from_items(cart.items.clone());
    }
    let mut items = cart.items.clone();
    items.push(CartItem { quantity: 1, ..item });
    Cart::from_items(items)
}

pub fn remove_from_cart(cart: &Cart, course_id: i64) -> Cart {
    Cart::from_items(
        cart.items
            .iter()
            .filter(|item| item.course_id != course_id)
            .cloned()
            .collect(),
    )
}

pub fn clear_cart() -> Cart {
    Cart::empty()
}

/// Serializes the cart for the `oa_cart` cookie.
pub fn encode_cart_cookie(cart: &Cart) -> String {
    let json = serde_json::to_string(cart).unwrap_or_else(|_| "{\"items\":[]}".to_string());
    utf8_percent_encode(&json, NON_ALPHANUMERIC).to_string()
}

/// Reads the `oa_cart` cookie. A missing or unreadable value yields an empty
/// cart. Stored totals and quantities are ignored; duplicate courses, bad
/// prices and entries past [`MAX_CART_ITEMS`] are dropped.
///
/// Prices still come from the client. Anything that charges or discounts
/// must reprice the cart against the catalog first.
pub fn decode_cart_cookie(raw: Option<&str>) -> Cart {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Cart::empty(),
    };
    let decoded = match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => return Cart::empty(),
    };
    match serde_json::from_str::<StoredCart>(&decoded) {
        Ok(stored) => {
            let mut seen = HashSet::new();
            let items: Vec<CartItem> = stored
                .items
                .into_iter()
                .filter(|item| item.price.is_finite() && item.price >= 0.0)
                .filter(|item| seen.insert(item.course_id))
                .take(MAX_CART_ITEMS)
                .map(|item| CartItem { quantity: 1, ..item })
                .collect();
            Cart::from_items(items)
        }
        Err(err) => {
            tracing::debug!(error = %err, "Discarding unreadable cart cookie");
            Cart::empty()
        }
    }
}

#[derive(serde::Deserialize)]
struct StoredCart {
    #[serde(default)]
    items: Vec<CartItem>,
}
