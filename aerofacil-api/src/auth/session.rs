use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aerofacil_core::User;
use crate::state::AuthConfig;

pub const SESSION_COOKIE: &str = "aerofacil_session";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        sub: user.id,
        username: user.username.clone(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
}

/// Expired, tampered or malformed tokens all read as "no session".
pub fn decode_token(auth: &AuthConfig, token: &str) -> Option<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn session_cookie(auth: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(auth.secure_cookies)
        .build()
}

pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
