//! Locale routing for the storefront.
//!
//! The locale comes from, in order: the first path segment (`/es/...`), the
//! `NEXT_LOCALE` cookie, the `Accept-Language` header, then the default.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::utils::cookies::cookie_from_headers;

pub const LOCALE_COOKIE_NAME: &str = "NEXT_LOCALE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Es];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Matches a language tag on its primary subtag (`es-MX` → `es`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str().eq_ignore_ascii_case(primary))
    }
}

fn locale_from_path(path: &str) -> Option<Locale> {
    let segment = path.trim_start_matches('/').split('/').next()?;
    Locale::ALL
        .into_iter()
        .find(|locale| locale.as_str() == segment)
}

/// Picks the supported language with the highest quality value. Ties keep
/// header order.
fn locale_from_accept_language(header: &str) -> Option<Locale> {
    let mut candidates: Vec<(Locale, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            let quality = parts
                .find_map(|param| param.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                .unwrap_or(1.0);
            if quality <= 0.0 {
                return None;
            }
            Some((Locale::from_tag(tag)?, quality))
        })
        .collect();
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.first().map(|(locale, _)| *locale)
}

pub fn resolve_locale(
    path: &str,
    cookie: Option<&str>,
    accept_language: Option<&str>,
) -> Locale {
    locale_from_path(path)
        .or_else(|| cookie.and_then(Locale::from_tag))
        .or_else(|| accept_language.and_then(locale_from_accept_language))
        .unwrap_or_default()
}

pub async fn locale(mut req: Request, next: Next) -> Response {
    let cookie = cookie_from_headers(req.headers(), LOCALE_COOKIE_NAME);
    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let locale = resolve_locale(req.uri().path(), cookie.as_deref(), accept_language);

    req.extensions_mut().insert(locale);
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        header::CONTENT_LANGUAGE,
        HeaderValue::from_static(locale.as_str()),
    );
    response
}
