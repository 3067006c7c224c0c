use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers,
    middleware::{locale, log_error_responses, request_id, require_session, REQUEST_ID_HEADER},
    state::AppState,
};

/// Builds the full API router with shared layers applied.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::meta::health))
        .route("/api/locale", get(handlers::meta::current_locale))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/verify", get(handlers::auth::verify))
        .route(
            "/api/cart",
            get(handlers::cart::get_cart).post(handlers::cart::update_cart),
        )
        .route(
            "/api/discounts/validate",
            post(handlers::discounts::validate_discount),
        )
        .route("/api/courses", get(handlers::courses::list_courses))
        .route("/api/courses/{slug}", get(handlers::courses::get_course))
        .route(
            "/api/stripe/checkout",
            post(handlers::stripe::create_checkout),
        )
        .route("/api/stripe/webhook", post(handlers::stripe::webhook));

    let session_routes = Router::new()
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let cors = cors_layer(&state.config.cors_allow_origins);

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum_middleware::from_fn(locale))
                .layer(axum_middleware::from_fn(log_error_responses)),
        )
        .with_state(state)
}

/// `*` allows any origin without credentials; an explicit list allows
/// credentialed requests from those origins only.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .max_age(Duration::from_secs(24 * 60 * 60));

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any).allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(allowed)
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_credentials(true)
}
