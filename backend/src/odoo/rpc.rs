//! JSON-RPC 2.0 transport to the Odoo `/jsonrpc` endpoint.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::Instrument;

use crate::config::OdooConfig;

#[derive(Debug, thiserror::Error)]
pub enum OdooError {
    #[error("Odoo request failed with HTTP status {status}")]
    Http { status: u16 },
    #[error("Odoo RPC error: {0}")]
    Rpc(String),
    #[error("Odoo service account authentication failed")]
    AuthenticationFailed,
    #[error("Odoo transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected Odoo response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: i64,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RpcErrorData>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorData {
    #[serde(default)]
    message: Option<String>,
}

impl RpcErrorBody {
    fn into_message(self) -> String {
        self.data
            .and_then(|data| data.message)
            .filter(|message| !message.is_empty())
            .or(self.message)
            .unwrap_or_else(|| "Unknown Odoo error".to_string())
    }
}

pub struct OdooClient {
    http: Client,
    endpoint: String,
    db: String,
    username: String,
    password: String,
    service_uid: OnceCell<i64>,
}

impl OdooClient {
    pub fn new(config: &OdooConfig, timeout: Duration) -> Result<Self, OdooError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/jsonrpc", config.url.trim_end_matches('/')),
            db: config.db.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            service_uid: OnceCell::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Uid of the service account, authenticated once per process. Concurrent
    /// first callers wait on the same authenticate call; there is no
    /// invalidation afterwards.
    pub async fn authenticate(&self) -> Result<i64, OdooError> {
        self.service_uid
            .get_or_try_init(|| async {
                let uid = self
                    .authenticate_login(&self.username, &self.password)
                    .await?
                    .ok_or(OdooError::AuthenticationFailed)?;
                tracing::info!(uid, db = %self.db, "Authenticated Odoo service account");
                Ok::<i64, OdooError>(uid)
            })
            .await
            .copied()
    }

    /// Checks end-user credentials. `None` means Odoo rejected them.
    pub async fn authenticate_login(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<i64>, OdooError> {
        let result = self
            .call(
                "common",
                "authenticate",
                vec![json!(self.db), json!(login), json!(password), json!({})],
            )
            .await?;
        match result {
            Value::Number(number) => number
                .as_i64()
                .filter(|uid| *uid > 0)
                .map(Some)
                .ok_or_else(|| OdooError::UnexpectedResponse(format!("uid {}", number))),
            Value::Bool(false) | Value::Null => Ok(None),
            other => Err(OdooError::UnexpectedResponse(format!(
                "authenticate returned {}",
                other
            ))),
        }
    }

    pub async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, OdooError> {
        let uid = self.authenticate().await?;
        self.call(
            "object",
            "execute_kw",
            vec![
                json!(self.db),
                json!(uid),
                json!(self.password),
                json!(model),
                json!(method),
                args,
                kwargs,
            ],
        )
        .await
    }

    async fn call(&self, service: &str, method: &str, args: Vec<Value>) -> Result<Value, OdooError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: RpcParams {
                service,
                method,
                args,
            },
            id: Utc::now().timestamp_millis(),
        };

        let span = tracing::debug_span!("odoo_rpc", service, method);
        async move {
            let response = self.http.post(&self.endpoint).json(&request).send().await?;
            let status = response.status();
            if !status.is_success() {
                tracing::warn!(status = status.as_u16(), "Odoo returned an HTTP error");
                return Err(OdooError::Http {
                    status: status.as_u16(),
                });
            }

            let body: RpcResponse = response.json().await?;
            if let Some(error) = body.error {
                let message = error.into_message();
                tracing::warn!(error = %message, "Odoo returned an RPC error");
                return Err(OdooError::Rpc(message));
            }
            Ok(body.result.unwrap_or(Value::Null))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_prefers_data_message() {
        let body: RpcErrorBody = serde_json::from_value(json!({
            "code": 200,
            "message": "Odoo Server Error",
            "data": {"name": "odoo.exceptions.AccessDenied", "message": "Access Denied"}
        }))
        .expect("error body");
        assert_eq!(body.into_message(), "Access Denied");
    }

    #[test]
    fn rpc_error_falls_back_to_top_level_message() {
        let body: RpcErrorBody =
            serde_json::from_value(json!({"code": 100, "message": "Odoo Session Expired"}))
                .expect("error body");
        assert_eq!(body.into_message(), "Odoo Session Expired");
    }

    #[test]
    fn request_envelope_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: RpcParams {
                service: "common",
                method: "authenticate",
                args: vec![json!("db"), json!("user"), json!("pw"), json!({})],
            },
            id: 42,
        };
        let value = serde_json::to_value(&request).expect("json");
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "call");
        assert_eq!(value["params"]["service"], "common");
        assert_eq!(value["params"]["args"][1], "user");
        assert_eq!(value["id"], 42);
    }

    #[test]
    fn endpoint_appends_jsonrpc_path() {
        let client = OdooClient::new(
            &OdooConfig {
                url: "https://erp.example.com/".into(),
                db: "db".into(),
                username: "u".into(),
                password: "p".into(),
            },
            Duration::from_secs(5),
        )
        .expect("client");
        assert_eq!(client.endpoint(), "https://erp.example.com/jsonrpc");
    }
}
