use axum::http::{header, StatusCode};
use outliers_backend::utils::cookies::SESSION_COOKIE_NAME;
use serde_json::json;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer,
};

mod support;

use support::{
    app, authenticate_call, body_json, execute_kw_call, extract_set_cookie_value, get_request,
    json_request, odoo_config, rpc_error, rpc_result, set_cookie_line, test_config, SERVICE_LOGIN,
    SERVICE_UID,
};

async fn odoo_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc"))
        .and(authenticate_call(SERVICE_LOGIN))
        .respond_with(rpc_result(json!(SERVICE_UID)))
        .mount(&server)
        .await;
    server
}

fn odoo_app(server: &MockServer) -> axum::Router {
    let mut config = test_config();
    config.odoo = Some(odoo_config(&server.uri()));
    app(config)
}

#[tokio::test]
async fn login_with_valid_credentials_sets_session_cookie() {
    let server = odoo_server().await;
    Mock::given(path("/jsonrpc"))
        .and(authenticate_call("ada@example.com"))
        .respond_with(rpc_result(json!(7)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.users", "read"))
        .respond_with(rpc_result(json!([{
            "id": 7,
            "login": "ada@example.com",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "partner_id": [11, "Ada Lovelace"]
        }])))
        .mount(&server)
        .await;

    let app = odoo_app(&server);
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "login": "ada@example.com", "password": "correct-horse" }),
        ))
        .await
        .expect("login response");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie_line = set_cookie_line(response.headers(), SESSION_COOKIE_NAME).expect("cookie");
    assert!(cookie_line.contains("HttpOnly"));
    assert!(cookie_line.contains("Max-Age=86400"));
    let token = extract_set_cookie_value(response.headers(), SESSION_COOKIE_NAME).expect("token");

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["uid"], 7);
    assert_eq!(body["user"]["name"], "Ada Lovelace");

    let verify = app
        .oneshot(get_request(
            "/api/auth/verify",
            Some(&format!("{}={}", SESSION_COOKIE_NAME, token)),
        ))
        .await
        .expect("verify response");
    assert_eq!(verify.status(), StatusCode::OK);
    let body = body_json(verify).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["login"], "ada@example.com");
}

#[tokio::test]
async fn login_accepts_email_alias() {
    let server = odoo_server().await;
    Mock::given(path("/jsonrpc"))
        .and(authenticate_call("grace@example.com"))
        .respond_with(rpc_result(json!(8)))
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.users", "read"))
        .respond_with(rpc_result(json!([])))
        .mount(&server)
        .await;

    let response = odoo_app(&server)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "grace@example.com", "password": "pw-123456" }),
        ))
        .await
        .expect("login response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["login"], "grace@example.com");
    assert_eq!(body["user"]["name"], serde_json::Value::Null);
}

#[tokio::test]
async fn login_with_wrong_password_returns_401_without_cookie() {
    let server = odoo_server().await;
    Mock::given(path("/jsonrpc"))
        .and(authenticate_call("ada@example.com"))
        .respond_with(rpc_result(json!(false)))
        .mount(&server)
        .await;

    let response = odoo_app(&server)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "login": "ada@example.com", "password": "wrong" }),
        ))
        .await
        .expect("login response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn login_without_password_is_rejected() {
    let server = odoo_server().await;
    let response = odoo_app(&server)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "login": "ada@example.com", "password": "" }),
        ))
        .await
        .expect("login response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_surfaces_rpc_failures_as_500() {
    let server = MockServer::start().await;
    Mock::given(path("/jsonrpc"))
        .and(authenticate_call("ada@example.com"))
        .respond_with(rpc_error("Database outliers does not exist"))
        .mount(&server)
        .await;

    let response = odoo_app(&server)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "login": "ada@example.com", "password": "pw" }),
        ))
        .await
        .expect("login response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Odoo RPC error: Database outliers does not exist");
}

#[tokio::test]
async fn auth_endpoints_answer_503_when_odoo_is_not_configured() {
    let app = support::app(test_config());

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "login": "ada@example.com", "password": "pw" }),
        ))
        .await
        .expect("login response");
    assert_eq!(login.status(), StatusCode::SERVICE_UNAVAILABLE);

    let signup = app
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "long-enough" }),
        ))
        .await
        .expect("signup response");
    assert_eq!(signup.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn dashboard_answers_503_for_a_valid_session_when_odoo_is_not_configured() {
    let state = outliers_backend::state::AppState::from_config(test_config()).expect("state");
    let token = state
        .sessions
        .sign(&outliers_backend::utils::session::SessionPayload::new(
            7,
            "ada@example.com".into(),
            None,
        ))
        .expect("token");

    let response = outliers_backend::routes::build_router(state)
        .oneshot(get_request(
            "/api/dashboard",
            Some(&format!("{}={}", SESSION_COOKIE_NAME, token)),
        ))
        .await
        .expect("dashboard response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn signup_creates_portal_user_and_signs_in() {
    let server = odoo_server().await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.users", "search"))
        .respond_with(rpc_result(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.partner", "create"))
        .respond_with(rpc_result(json!(11)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.users", "create"))
        .respond_with(rpc_result(json!(7)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("ir.model.data", "search_read"))
        .respond_with(rpc_result(json!([{ "id": 1, "res_id": 10 }])))
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.users", "write").arg(5, json!([[7], { "groups_id": [[6, 0, [10]]] }])))
        .respond_with(rpc_result(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let response = odoo_app(&server)
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({ "name": "Ada Lovelace", "email": "Ada@Example.com", "password": "analytical-engine" }),
        ))
        .await
        .expect("signup response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(extract_set_cookie_value(response.headers(), SESSION_COOKIE_NAME).is_some());
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["uid"], 7);
    assert_eq!(body["user"]["login"], "ada@example.com");
    assert_eq!(body["user"]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn signup_with_existing_login_conflicts() {
    let server = odoo_server().await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.users", "search"))
        .respond_with(rpc_result(json!([7])))
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.partner", "create"))
        .respond_with(rpc_result(json!(11)))
        .expect(0)
        .mount(&server)
        .await;

    let response = odoo_app(&server)
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "analytical-engine" }),
        ))
        .await
        .expect("signup response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn signup_validates_input_before_calling_odoo() {
    let server = MockServer::start().await;
    let app = odoo_app(&server);

    let missing = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({ "email": "ada@example.com", "password": "analytical-engine" }),
        ))
        .await
        .expect("signup response");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let bad_email = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({ "name": "Ada", "email": "not-an-email", "password": "analytical-engine" }),
        ))
        .await
        .expect("signup response");
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_email).await["code"], "VALIDATION_ERROR");

    let short_password = app
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "short" }),
        ))
        .await
        .expect("signup response");
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn logout_clears_session_cookie() {
    let response = app(test_config())
        .oneshot(json_request("POST", "/api/auth/logout", json!({})))
        .await
        .expect("logout response");

    assert_eq!(response.status(), StatusCode::OK);
    let line = set_cookie_line(response.headers(), SESSION_COOKIE_NAME).expect("cookie");
    assert!(line.starts_with(&format!("{}=;", SESSION_COOKIE_NAME)));
    assert!(line.contains("Max-Age=0"));
    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn verify_without_valid_cookie_is_unauthenticated() {
    let app = app(test_config());

    let none = app
        .clone()
        .oneshot(get_request("/api/auth/verify", None))
        .await
        .expect("verify response");
    assert_eq!(none.status(), StatusCode::OK);
    assert_eq!(
        body_json(none).await,
        json!({ "authenticated": false, "user": null })
    );

    let forged = app
        .oneshot(get_request(
            "/api/auth/verify",
            Some("oa_session=eyJhbGciOiJIUzI1NiJ9.e30.forged"),
        ))
        .await
        .expect("verify response");
    assert_eq!(body_json(forged).await["authenticated"], false);
}

#[tokio::test]
async fn dashboard_requires_a_session() {
    let response = app(test_config())
        .oneshot(get_request("/api/dashboard", None))
        .await
        .expect("dashboard response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_lists_enrolled_courses() {
    let server = odoo_server().await;
    Mock::given(path("/jsonrpc"))
        .and(authenticate_call("ada@example.com"))
        .respond_with(rpc_result(json!(7)))
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("res.users", "read"))
        .respond_with(rpc_result(json!([{
            "id": 7,
            "login": "ada@example.com",
            "name": "Ada Lovelace",
            "email": false,
            "partner_id": [11, "Ada Lovelace"]
        }])))
        .mount(&server)
        .await;
    Mock::given(path("/jsonrpc"))
        .and(execute_kw_call("slide.channel", "search_read").arg(5, json!([[["partner_ids", "in", [11]]]])))
        .respond_with(rpc_result(json!([{
            "id": 3,
            "name": "SQL for Analysts",
            "description_short": "Joins and aggregates",
            "product_id": false
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let app = odoo_app(&server);
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "login": "ada@example.com", "password": "pw" }),
        ))
        .await
        .expect("login response");
    let token = extract_set_cookie_value(login.headers(), SESSION_COOKIE_NAME).expect("token");

    let response = app
        .oneshot(get_request(
            "/api/dashboard",
            Some(&format!("{}={}", SESSION_COOKIE_NAME, token)),
        ))
        .await
        .expect("dashboard response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["uid"], 7);
    assert_eq!(body["courses"][0]["slug"], "sql-for-analysts-3");
}
