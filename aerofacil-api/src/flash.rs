//! One-shot messages carried across a redirect in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "aerofacil_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub text: String,
}

impl Flash {
    pub fn css_class(&self) -> &'static str {
        match self.level {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        }
    }
}

pub fn encode(flashes: &[Flash]) -> String {
    let json = serde_json::to_vec(flashes).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Unreadable cookies decode to no messages.
pub fn decode(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Queues a message for the next rendered page.
pub fn push(jar: CookieJar, level: FlashLevel, text: impl Into<String>) -> CookieJar {
    let mut flashes = jar.get(FLASH_COOKIE).map(|c| decode(c.value())).unwrap_or_default();
    flashes.push(Flash { level, text: text.into() });

    let cookie = Cookie::build((FLASH_COOKIE, encode(&flashes)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Reads pending messages and clears them.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    match jar.get(FLASH_COOKIE).map(|c| decode(c.value())) {
        Some(flashes) => (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flashes),
        None => (jar, Vec::new()),
    }
}
