use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::session::session_from_headers,
    models::checkout::{CheckoutBody, CheckoutResponse, WebhookAck},
    state::AppState,
    stripe::{
        webhook::{construct_event, StripeEvent, SIGNATURE_HEADER},
        CheckoutRequest,
    },
};

const CHECKOUT_SUCCESS_PATH: &str = "/checkout/success?session_id={CHECKOUT_SESSION_ID}";
const CHECKOUT_CANCEL_PATH: &str = "/pricing";

pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let price_id = payload
        .price_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("priceId is required".into()))?
        .to_string();
    let stripe = state.stripe()?;

    let app_url = state.config.app_url.trim_end_matches('/');
    let request = CheckoutRequest {
        price_id,
        quantity: 1,
        success_url: non_blank(payload.success_url)
            .unwrap_or_else(|| format!("{}{}", app_url, CHECKOUT_SUCCESS_PATH)),
        cancel_url: non_blank(payload.cancel_url)
            .unwrap_or_else(|| format!("{}{}", app_url, CHECKOUT_CANCEL_PATH)),
        customer_email: session_from_headers(&headers, &state.sessions)
            .map(|session| session.login),
    };

    let session = stripe.create_checkout_session(&request).await?;
    Ok(Json(CheckoutResponse {
        id: session.id,
        url: session.url,
    }))
}

pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let secret = state
        .config
        .stripe
        .as_ref()
        .and_then(|stripe| stripe.webhook_secret.as_deref())
        .ok_or_else(|| {
            AppError::ServiceUnavailable("Stripe webhooks are not configured".into())
        })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let event = construct_event(signature, &body, secret, Utc::now().timestamp()).map_err(
        |err| {
            tracing::warn!(error = %err, "Rejected Stripe webhook");
            AppError::BadRequest(err.to_string())
        },
    )?;

    record_event(&event);
    Ok(Json(WebhookAck { received: true }))
}

fn record_event(event: &StripeEvent) {
    let object = &event.data.object;
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let email = str_field(object, &["customer_details", "email"])
                .or_else(|| str_field(object, &["customer_email"]));
            let amount_total = int_field(object, "amount_total");
            tracing::info!(
                event_id = %event.id,
                session_id = str_field(object, &["id"]).unwrap_or("-"),
                customer_email = email.unwrap_or("-"),
                amount_total,
                currency = str_field(object, &["currency"]).unwrap_or("-"),
                "Checkout session completed"
            );
        }
        "payment_intent.succeeded" => {
            let amount = int_field(object, "amount");
            tracing::info!(
                event_id = %event.id,
                payment_intent = str_field(object, &["id"]).unwrap_or("-"),
                amount,
                "Payment succeeded"
            );
        }
        "payment_intent.payment_failed" => {
            tracing::warn!(
                event_id = %event.id,
                payment_intent = str_field(object, &["id"]).unwrap_or("-"),
                reason = str_field(object, &["last_payment_error", "message"]).unwrap_or("-"),
                "Payment failed"
            );
        }
        other => {
            tracing::debug!(event_id = %event.id, event_type = other, "Unhandled Stripe event");
        }
    }
}

fn str_field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |current, key| current.get(key))
        .and_then(Value::as_str)
}

fn int_field(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(Value::as_i64)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
