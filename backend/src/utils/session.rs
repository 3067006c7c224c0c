//! Signed session tokens carried in the `oa_session` cookie.
//!
//! The token is an HS256 JWT. Verification never fails loudly: any decoding,
//! signature, or expiry problem simply means "no session".

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Identity claim carried by a signed-in browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub uid: i64,
    pub login: String,
    pub name: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl SessionPayload {
    /// Creates a payload issued now. Sub-second precision is dropped so the
    /// payload survives a round trip through the token unchanged.
    pub fn new(uid: i64, login: String, name: Option<String>) -> Self {
        Self {
            uid,
            login,
            name,
            issued_at: Utc::now().trunc_subsecs(0),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    uid: i64,
    login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs the payload; the token expires `ttl` after `payload.issued_at`.
    pub fn sign(&self, payload: &SessionPayload) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = payload.issued_at.timestamp();
        let claims = SessionClaims {
            uid: payload.uid,
            login: payload.login.clone(),
            name: payload.name.clone(),
            iat,
            exp: (payload.issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(error = %err, "Rejected session token");
                return None;
            }
        };
        let claims = data.claims;
        let issued_at = DateTime::from_timestamp(claims.iat, 0)?;
        Some(SessionPayload {
            uid: claims.uid,
            login: claims.login,
            name: claims.name,
            issued_at,
        })
    }
}
