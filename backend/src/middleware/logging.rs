use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
    Error as AxumError,
};
use std::time::Instant;

use super::{locale::Locale, request_id::RequestId};

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 2048;

struct ErrorEvent<'a> {
    status: u16,
    method: &'a str,
    path: &'a str,
    request_id: Option<&'a str>,
    locale: Option<Locale>,
    latency_ms: u64,
}

/// Logs every 4xx/5xx response with a preview of its body. The body is
/// buffered and handed back to the caller unchanged.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = req.extensions().get::<RequestId>().map(|id| id.0.clone());
    let locale = req.extensions().get::<Locale>().copied();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let event = ErrorEvent {
        status: status.as_u16(),
        method: &method,
        path: &path,
        request_id: request_id.as_deref(),
        locale,
        latency_ms: start.elapsed().as_millis() as u64,
    };

    let (mut parts, body) = response.into_parts();
    match buffer_body(body).await {
        Ok((bytes, preview)) => {
            log_error_event(&event, &preview, None);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            log_error_event(&event, "", Some(err));
            Response::from_parts(parts, Body::empty())
        }
    }
}

async fn buffer_body(body: Body) -> Result<(Bytes, String), AxumError> {
    let bytes = to_bytes(body, MAX_BUFFERED_BODY_BYTES).await?;
    Ok((bytes.clone(), body_preview(&bytes)))
}

fn body_preview(bytes: &Bytes) -> String {
    if bytes.len() > MAX_LOGGED_BODY_BYTES {
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&bytes[..MAX_LOGGED_BODY_BYTES]),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}

fn log_error_event(event: &ErrorEvent<'_>, body_preview: &str, body_error: Option<AxumError>) {
    let request_id = event.request_id.unwrap_or("-");
    let locale = event.locale.map(Locale::as_str).unwrap_or("-");

    if let Some(err) = body_error {
        tracing::error!(
            status = event.status,
            method = event.method,
            path = event.path,
            request_id,
            latency_ms = event.latency_ms,
            error = ?err,
            "Failed to read error response body"
        );
        return;
    }

    if event.status >= 500 {
        tracing::error!(
            status = event.status,
            method = event.method,
            path = event.path,
            request_id,
            locale,
            latency_ms = event.latency_ms,
            body = body_preview,
            "Request completed with error status"
        );
    } else {
        tracing::warn!(
            status = event.status,
            method = event.method,
            path = event.path,
            request_id,
            locale,
            latency_ms = event.latency_ms,
            body = body_preview,
            "Request completed with error status"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn preview_truncates_large_bodies() {
        let bytes = Bytes::from(vec![b'a'; MAX_LOGGED_BODY_BYTES + 10]);
        let preview = body_preview(&bytes);
        assert!(preview.ends_with(&format!("(truncated, {} bytes total)", bytes.len())));
    }

    #[tokio::test]
    async fn error_body_is_forwarded_unchanged() {
        let app = Router::new()
            .route(
                "/fail",
                get(|| async { (StatusCode::BAD_REQUEST, "{\"error\":\"bad\"}") }),
            )
            .layer(middleware::from_fn(log_error_responses));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/fail")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&bytes[..], b"{\"error\":\"bad\"}");
    }
}
