#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, Response},
    Router,
};
use outliers_backend::{
    config::{Config, OdooConfig, StripeConfig},
    routes::build_router,
    state::AppState,
    utils::cookies::SameSite,
};
use serde_json::{json, Value};
use wiremock::{Match, ResponseTemplate};

pub const AUTH_SECRET: &str = "test-auth-secret";
pub const ODOO_DB: &str = "outliers";
pub const SERVICE_LOGIN: &str = "service@outliers.academy";
pub const SERVICE_PASSWORD: &str = "service-password";
pub const SERVICE_UID: i64 = 2;
pub const STRIPE_SECRET_KEY: &str = "sk_test_123";
pub const WEBHOOK_SECRET: &str = "whsec_test";

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".parse().expect("bind addr"),
        auth_secret: AUTH_SECRET.into(),
        session_ttl_hours: 24,
        cookie_secure: false,
        cookie_same_site: SameSite::Lax,
        cors_allow_origins: vec!["http://localhost:3000".into()],
        app_url: "http://localhost:3000".into(),
        http_client_timeout_seconds: 5,
        odoo: None,
        stripe: None,
        production_mode: false,
    }
}

pub fn odoo_config(url: &str) -> OdooConfig {
    OdooConfig {
        url: url.to_string(),
        db: ODOO_DB.into(),
        username: SERVICE_LOGIN.into(),
        password: SERVICE_PASSWORD.into(),
    }
}

pub fn stripe_config(api_base: &str, webhook_secret: Option<&str>) -> StripeConfig {
    StripeConfig {
        secret_key: STRIPE_SECRET_KEY.into(),
        webhook_secret: webhook_secret.map(str::to_string),
        api_base: api_base.to_string(),
    }
}

pub fn app(config: Config) -> Router {
    build_router(AppState::from_config(config).expect("app state"))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn json_request_with_cookie(method: &str, uri: &str, cookie: &str, body: Value) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request.headers_mut().insert(
        header::COOKIE,
        cookie.parse().expect("cookie header"),
    );
    request
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Full `Set-Cookie` line for `name`, attributes included.
pub fn set_cookie_line(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(str::to_string)
}

pub fn extract_set_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let line = set_cookie_line(headers, name)?;
    let value = line
        .strip_prefix(&format!("{name}="))?
        .split(';')
        .next()?
        .trim()
        .to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Matches one JSON-RPC call on the `/jsonrpc` endpoint by service, method
/// and selected positional arguments.
pub struct RpcCall {
    service: &'static str,
    method: &'static str,
    args: Vec<(usize, Value)>,
}

impl RpcCall {
    pub fn arg(mut self, index: usize, value: Value) -> Self {
        self.args.push((index, value));
        self
    }
}

impl Match for RpcCall {
    fn matches(&self, request: &wiremock::Request) -> bool {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return false,
        };
        let params = &body["params"];
        body["jsonrpc"] == "2.0"
            && body["method"] == "call"
            && params["service"] == self.service
            && params["method"] == self.method
            && self
                .args
                .iter()
                .all(|(index, expected)| &params["args"][*index] == expected)
    }
}

/// `common.authenticate` for the given login.
pub fn authenticate_call(login: &str) -> RpcCall {
    RpcCall {
        service: "common",
        method: "authenticate",
        args: Vec::new(),
    }
    .arg(1, json!(login))
}

/// `object.execute_kw` on `model.method`.
pub fn execute_kw_call(model: &str, method: &str) -> RpcCall {
    RpcCall {
        service: "object",
        method: "execute_kw",
        args: Vec::new(),
    }
    .arg(3, json!(model))
    .arg(4, json!(method))
}

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

pub fn rpc_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {
            "code": 200,
            "message": "Odoo Server Error",
            "data": { "name": "odoo.exceptions.AccessError", "message": message },
        },
    }))
}
