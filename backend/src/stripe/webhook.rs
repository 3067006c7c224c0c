//! Verification of Stripe webhook deliveries.
//!
//! The `Stripe-Signature` header looks like `t=1700000000,v1=<hex>,v1=<hex>`.
//! A delivery is genuine when one `v1` entry equals
//! HMAC-SHA256(secret, "{t}.{body}") and `t` is within the tolerance window.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Missing Stripe-Signature header")]
    MissingSignature,
    #[error("Malformed Stripe-Signature header")]
    MalformedHeader,
    #[error("No matching signature found")]
    SignatureMismatch,
    #[error("Webhook timestamp outside the tolerance window")]
    TimestampOutOfTolerance,
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: Option<i64>,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let (key, value) = match part.trim().split_once('=') {
            Some(pair) => pair,
            None => continue,
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            // Ignore entries that are not hex; they cannot match anyway.
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Builds a header value the way Stripe does; used to sign test deliveries.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(compute_signature(secret, timestamp, payload))
    )
}

pub fn verify_signature(
    header: Option<&str>,
    payload: &[u8],
    secret: &str,
    now: i64,
    tolerance_seconds: i64,
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let parsed = parse_header(header)?;
    let expected = compute_signature(secret, parsed.timestamp, payload);

    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }
    if (now - parsed.timestamp).abs() > tolerance_seconds {
        return Err(WebhookError::TimestampOutOfTolerance);
    }
    Ok(())
}

/// Verifies the delivery and decodes the event it carries.
pub fn construct_event(
    header: Option<&str>,
    payload: &[u8],
    secret: &str,
    now: i64,
) -> Result<StripeEvent, WebhookError> {
    verify_signature(header, payload, secret, now, DEFAULT_TOLERANCE_SECONDS)?;
    serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}
