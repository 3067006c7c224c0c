//! Stripe Checkout and webhook support.

pub mod client;
pub mod webhook;

pub use client::{CheckoutRequest, CheckoutSession, StripeClient};

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Stripe transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
