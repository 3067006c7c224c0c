use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    state::AppState,
    utils::{
        cookies::{cookie_from_headers, SESSION_COOKIE_NAME},
        session::{SessionCodec, SessionPayload},
    },
};

/// Decodes the session cookie, if any. Invalid or expired cookies read as
/// "no session".
pub fn session_from_headers(headers: &HeaderMap, codec: &SessionCodec) -> Option<SessionPayload> {
    let token = cookie_from_headers(headers, SESSION_COOKIE_NAME)?;
    codec.verify(&token)
}

/// Rejects requests without a valid session and exposes the payload to the
/// handler as an extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match session_from_headers(request.headers(), &state.sessions) {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => AppError::Unauthorized("Authentication required".into()).into_response(),
    }
}
