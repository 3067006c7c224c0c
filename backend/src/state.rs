use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    error::AppError,
    odoo::{OdooApi, OdooClient},
    services::catalog::CourseCatalog,
    stripe::StripeClient,
    utils::{cookies::CookieOptions, session::SessionCodec},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionCodec,
    pub odoo: Option<Arc<dyn OdooApi>>,
    pub stripe: Option<Arc<StripeClient>>,
}

impl AppState {
    /// Builds the upstream clients described by `config`. Missing sections
    /// leave the corresponding client unset.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.http_client_timeout_seconds);
        let odoo = match &config.odoo {
            Some(odoo_config) => {
                Some(Arc::new(OdooClient::new(odoo_config, timeout)?) as Arc<dyn OdooApi>)
            }
            None => None,
        };
        let stripe = match &config.stripe {
            Some(stripe_config) => Some(Arc::new(StripeClient::new(stripe_config, timeout)?)),
            None => None,
        };
        Ok(Self::new(config, odoo, stripe))
    }

    pub fn new(
        config: Config,
        odoo: Option<Arc<dyn OdooApi>>,
        stripe: Option<Arc<StripeClient>>,
    ) -> Self {
        let sessions = SessionCodec::new(
            &config.auth_secret,
            chrono::Duration::hours(config.session_ttl_hours),
        );
        Self {
            config,
            sessions,
            odoo,
            stripe,
        }
    }

    /// The ERP client, or 503 when the ERP is not configured.
    pub fn odoo(&self) -> Result<&Arc<dyn OdooApi>, AppError> {
        self.odoo.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Authentication service is not configured".into())
        })
    }

    pub fn stripe(&self) -> Result<&Arc<StripeClient>, AppError> {
        self.stripe
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("Payments are not configured".into()))
    }

    pub fn catalog(&self) -> CourseCatalog {
        CourseCatalog::new(self.odoo.clone())
    }

    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.config.cookie_secure,
            same_site: self.config.cookie_same_site,
        }
    }

    pub fn session_max_age(&self) -> Duration {
        Duration::from_secs(self.config.session_ttl_hours.max(0) as u64 * 60 * 60)
    }
}
