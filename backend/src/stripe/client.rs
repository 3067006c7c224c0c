use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::StripeError;
use crate::config::StripeConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub quantity: u32,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
}

impl CheckoutRequest {
    /// Form fields for `POST /v1/checkout/sessions`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("mode", "payment".to_string()),
            ("line_items[0][price]", self.price_id.clone()),
            ("line_items[0][quantity]", self.quantity.to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
        ];
        if let Some(email) = &self.customer_email {
            fields.push(("customer_email", email.clone()));
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig, timeout: Duration) -> Result<Self, StripeError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&request.form_fields())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response.json().await?;
        tracing::info!(session_id = %session.id, price_id = %request.price_id, "Created Stripe checkout session");
        Ok(session)
    }
}
