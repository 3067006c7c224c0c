use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::session::session_from_headers,
    models::user::{AuthResponse, LoginRequest, NewUser, SignupRequest, VerifyResponse},
    odoo::OdooApi,
    state::AppState,
    utils::{
        cookies::{build_clear_cookie, build_cookie, SESSION_COOKIE_NAME},
        session::SessionPayload,
    },
};

/// Outcome of restricting a freshly created user to portal access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalRestriction {
    /// The user belongs to the portal group only.
    Portal,
    /// The portal group could not be applied; all groups were removed.
    Cleared,
    /// Neither step succeeded; the user keeps the ERP's default groups.
    Unrestricted,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let odoo = state.odoo()?;
    let (login, password) = payload
        .credentials()
        .ok_or_else(|| AppError::BadRequest("Login and password are required".into()))?;

    let uid = odoo
        .authenticate_user(&login, &password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid login or password".into()))?;

    let (login, name) = match odoo.read_user_profile(uid).await {
        Ok(Some(profile)) if !profile.login.is_empty() => (profile.login, profile.name),
        Ok(_) => (login, None),
        Err(err) => {
            tracing::warn!(uid, error = %err, "Failed to read user profile after login");
            (login, None)
        }
    };

    let session = SessionPayload::new(uid, login, name);
    tracing::info!(uid, login = %session.login, "User logged in");
    session_response(&state, session)
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let odoo = state.odoo()?;
    if !payload.has_required_fields() {
        return Err(AppError::BadRequest(
            "Name, email and password are required".into(),
        ));
    }
    payload.validate()?;

    let name = payload.name.unwrap_or_default().trim().to_string();
    let email = payload.email.unwrap_or_default().trim().to_lowercase();
    let password = payload.password.unwrap_or_default();

    if odoo.find_user_by_login(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let partner_id = odoo.create_partner(&name, &email).await?;
    let uid = odoo
        .create_user(&NewUser {
            name: name.clone(),
            login: email.clone(),
            password,
            partner_id,
        })
        .await?;

    let restriction = restrict_to_portal(&**odoo, uid).await;
    tracing::info!(uid, partner_id, ?restriction, "User signed up");

    session_response(&state, SessionPayload::new(uid, email, Some(name)))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(
            header::SET_COOKIE,
            build_clear_cookie(SESSION_COOKIE_NAME, state.cookie_options()),
        )]),
        Json(json!({ "ok": true })),
    )
}

pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Json<VerifyResponse> {
    let user = session_from_headers(&headers, &state.sessions);
    Json(VerifyResponse {
        authenticated: user.is_some(),
        user,
    })
}

/// Best-effort: put the user in the portal group only, else strip every
/// group. Failures are logged and never abort the signup.
pub async fn restrict_to_portal(odoo: &dyn OdooApi, uid: i64) -> PortalRestriction {
    match odoo.find_portal_group().await {
        Ok(Some(group_id)) => match odoo.set_user_groups(uid, vec![group_id]).await {
            Ok(()) => return PortalRestriction::Portal,
            Err(err) => {
                tracing::warn!(uid, group_id, error = %err, "Failed to assign portal group")
            }
        },
        Ok(None) => tracing::warn!(uid, "Portal group not found in the ERP"),
        Err(err) => tracing::warn!(uid, error = %err, "Failed to look up portal group"),
    }

    match odoo.set_user_groups(uid, Vec::new()).await {
        Ok(()) => PortalRestriction::Cleared,
        Err(err) => {
            tracing::warn!(uid, error = %err, "Failed to clear groups; user keeps default groups");
            PortalRestriction::Unrestricted
        }
    }
}

fn session_response(
    state: &AppState,
    session: SessionPayload,
) -> Result<impl IntoResponse, AppError> {
    let token = state
        .sessions
        .sign(&session)
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    let cookie = build_cookie(
        SESSION_COOKIE_NAME,
        &token,
        state.session_max_age(),
        state.cookie_options(),
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(AuthResponse {
            ok: true,
            user: session,
        }),
    ))
}
