use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use crate::{
    error::AppError,
    models::cart::{Cart, CartAction, CartActionRequest, CartItem},
    services::cart::{
        add_to_cart, clear_cart, decode_cart_cookie, encode_cart_cookie, remove_from_cart,
    },
    state::AppState,
    utils::cookies::{build_cookie, cookie_from_headers, CART_COOKIE_MAX_AGE, CART_COOKIE_NAME},
};

/// Reads the cart carried by the `oa_cart` cookie. Prices are as the client
/// sent them.
pub fn cart_from_headers(headers: &HeaderMap) -> Cart {
    decode_cart_cookie(cookie_from_headers(headers, CART_COOKIE_NAME).as_deref())
}

pub async fn get_cart(headers: HeaderMap) -> Json<Cart> {
    Json(cart_from_headers(&headers))
}

pub async fn update_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CartActionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let action = payload
        .action
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Cart action is required".into()))?
        .parse::<CartAction>()
        .map_err(AppError::BadRequest)?;

    let current = cart_from_headers(&headers);
    let cart = match action {
        CartAction::Add => {
            let course_id = require_course_id(&payload)?;
            let course = state
                .catalog()
                .find_by_id(course_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Course not found".into()))?;
            add_to_cart(&current, CartItem::from_course(&course, payload.product_id))
        }
        CartAction::Remove => remove_from_cart(&current, require_course_id(&payload)?),
        CartAction::Clear => clear_cart(),
    };
    let cart = state.catalog().reprice(&cart).await?;

    tracing::debug!(?action, items = cart.items.len(), total = cart.total, "Cart updated");

    let cookie = build_cookie(
        CART_COOKIE_NAME,
        &encode_cart_cookie(&cart),
        CART_COOKIE_MAX_AGE,
        state.cookie_options(),
    );
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(cart)))
}

fn require_course_id(payload: &CartActionRequest) -> Result<i64, AppError> {
    payload
        .course_id
        .ok_or_else(|| AppError::BadRequest("courseId is required".into()))
}
