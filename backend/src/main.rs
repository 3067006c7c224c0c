use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use outliers_backend::{config::Config, routes::build_router, state::AppState};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "outliers_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        auth_secret = %mask_secret(&config.auth_secret),
        session_ttl_hours = config.session_ttl_hours,
        cookie_secure = config.cookie_secure,
        app_url = %config.app_url,
        cors_allow_origins = ?config.cors_allow_origins,
        odoo_url = config.odoo.as_ref().map(|odoo| odoo.url.as_str()).unwrap_or("<unset>"),
        odoo_db = config.odoo.as_ref().map(|odoo| odoo.db.as_str()).unwrap_or("<unset>"),
        odoo_password = %config
            .odoo
            .as_ref()
            .map(|odoo| mask_secret(&odoo.password))
            .unwrap_or_else(|| "<unset>".into()),
        stripe_secret_key = %config
            .stripe
            .as_ref()
            .map(|stripe| mask_secret(&stripe.secret_key))
            .unwrap_or_else(|| "<unset>".into()),
        stripe_webhooks = config
            .stripe
            .as_ref()
            .is_some_and(|stripe| stripe.webhook_secret.is_some()),
        production_mode = config.production_mode,
        "Loaded configuration from environment/.env"
    );

    if config.odoo.is_none() {
        tracing::warn!("Odoo is not configured; auth endpoints will answer 503 and the builtin course catalog is served");
    }
    if config.stripe.is_none() {
        tracing::warn!("Stripe is not configured; checkout endpoints will answer 503");
    }

    let addr = config.bind_addr;
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    // Start server
    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
