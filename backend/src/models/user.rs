//! Models for ERP users and the authentication payloads exchanged with the browser.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{models::course::Course, utils::session::SessionPayload};

/// User record as read from the ERP (`res.users`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Contact record (`res.partner`) linked to the user.
    pub partner_id: Option<i64>,
}

/// Values for a new ERP user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub login: String,
    pub password: String,
    pub partner_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    /// Accepted as an alias of `login`.
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(login, password)` when both are present and not blank.
    pub fn credentials(&self) -> Option<(String, String)> {
        let login = self
            .login
            .as_deref()
            .or(self.email.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())?;
        let password = self.password.as_deref().filter(|value| !value.is_empty())?;
        Some((login.to_string(), password.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 256))]
    pub password: Option<String>,
}

impl SignupRequest {
    pub fn has_required_fields(&self) -> bool {
        [&self.name, &self.email, &self.password]
            .iter()
            .all(|field| field.as_deref().map(str::trim).is_some_and(|v| !v.is_empty()))
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub ok: bool,
    pub user: SessionPayload,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub authenticated: bool,
    pub user: Option<SessionPayload>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: SessionPayload,
    pub courses: Vec<Course>,
}
