use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    error::AppError,
    handlers::cart::cart_from_headers,
    models::discount::{DiscountResult, ValidateDiscountRequest},
    services::discount::{calculate_discount, find_discount},
    state::AppState,
};

/// Validates a discount code against a subtotal. Without an explicit
/// subtotal the cart cookie is repriced against the catalog and its total
/// is used.
pub async fn validate_discount(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ValidateDiscountRequest>,
) -> Result<Json<DiscountResult>, AppError> {
    let code = payload
        .code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("Discount code is required".into()))?;

    let discount =
        find_discount(code).ok_or_else(|| AppError::NotFound("Discount code not found".into()))?;

    let subtotal = match payload.subtotal {
        Some(subtotal) => subtotal,
        None => {
            state
                .catalog()
                .reprice(&cart_from_headers(&headers))
                .await?
                .total
        }
    };

    let result = calculate_discount(subtotal, &discount).ok_or_else(|| {
        AppError::BadRequest("Discount code does not apply to this order".into())
    })?;

    tracing::debug!(
        code = %result.code,
        subtotal,
        discount_amount = result.discount_amount,
        "Discount applied"
    );
    Ok(Json(result))
}
