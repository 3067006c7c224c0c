use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, net::SocketAddr};

use crate::utils::cookies::SameSite;

const DEV_AUTH_SECRET: &str = "outliers-dev-secret-change-this-in-production";
const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdooConfig {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub auth_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub cors_allow_origins: Vec<String>,
    pub app_url: String,
    pub http_client_timeout_seconds: u64,
    pub odoo: Option<OdooConfig>,
    pub stripe: Option<StripeConfig>,
    pub production_mode: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Builds the configuration from an arbitrary variable source. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let production_mode = parse_bool(var("PRODUCTION_MODE").as_deref()).unwrap_or(false);

        let auth_secret = match var("AUTH_SECRET") {
            Some(secret) => secret,
            None if production_mode => {
                return Err(anyhow!("AUTH_SECRET must be set when PRODUCTION_MODE is enabled"))
            }
            None => {
                tracing::warn!("AUTH_SECRET not set, using the development fallback secret");
                DEV_AUTH_SECRET.to_string()
            }
        };

        let bind_addr_raw = var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3001".to_string());
        let bind_addr = bind_addr_raw
            .parse()
            .map_err(|_| anyhow!("Invalid BIND_ADDR value: {}", bind_addr_raw))?;

        let session_ttl_hours = var("SESSION_TTL_HOURS")
            .and_then(|v| v.parse().ok())
            .filter(|hours: &i64| *hours > 0)
            .unwrap_or(24);

        let cookie_secure =
            parse_bool(var("COOKIE_SECURE").as_deref()).unwrap_or(production_mode);

        let cookie_same_site = match var("COOKIE_SAMESITE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow!("Invalid COOKIE_SAMESITE value: {}", raw))?,
            None => SameSite::Lax,
        };

        let app_url = var("NEXT_PUBLIC_APP_URL")
            .unwrap_or_else(|| DEFAULT_APP_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&app_url)
            .map_err(|_| anyhow!("Invalid NEXT_PUBLIC_APP_URL value: {}", app_url))?;

        let cors_allow_origins = var("CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().trim_end_matches('/').to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![app_url.clone()]);

        let http_client_timeout_seconds = var("HTTP_CLIENT_TIMEOUT_SECONDS")
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(15);

        let odoo = match (
            var("ODOO_URL"),
            var("ODOO_DB"),
            var("ODOO_USERNAME"),
            var("ODOO_PASSWORD"),
        ) {
            (Some(url), Some(db), Some(username), Some(password)) => {
                url::Url::parse(&url).map_err(|_| anyhow!("Invalid ODOO_URL value: {}", url))?;
                Some(OdooConfig {
                    url: url.trim_end_matches('/').to_string(),
                    db,
                    username,
                    password,
                })
            }
            _ => None,
        };

        let stripe = var("STRIPE_SECRET_KEY").map(|secret_key| StripeConfig {
            secret_key,
            webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            api_base: var("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        });

        Ok(Config {
            bind_addr,
            auth_secret,
            session_ttl_hours,
            cookie_secure,
            cookie_same_site,
            cors_allow_origins,
            app_url,
            http_client_timeout_seconds,
            odoo,
            stripe,
            production_mode,
        })
    }
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw?.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
