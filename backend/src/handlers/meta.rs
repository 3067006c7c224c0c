use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::middleware::locale::Locale;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn current_locale(Extension(locale): Extension<Locale>) -> Json<Value> {
    Json(json!({
        "locale": locale,
        "supported": Locale::ALL,
    }))
}
