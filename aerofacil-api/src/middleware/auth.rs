use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;
use uuid::Uuid;

use crate::auth::session::{decode_token, SessionClaims, SESSION_COOKIE};
use crate::state::AppState;

// ============================================================================
// Session extraction
// ============================================================================

/// A signed-in user, resolved from the session cookie or a bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self { id: claims.sub, username: claims.username }
    }
}

fn session_from_parts(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    // 1. Session cookie
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie_token = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());

    // 2. Authorization header
    let token = cookie_token.or_else(|| {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_owned)
    })?;

    // 3. Decode and validate JWT
    decode_token(&state.auth, &token).map(CurrentUser::from)
}

/// Redirect to the login page, coming back to `next` afterwards.
pub fn login_redirect(next: &str) -> Response {
    Redirect::to(&format!("/login?next={}", urlencoding::encode(next))).into_response()
}

// ============================================================================
// Guards
// ============================================================================

/// Requires a session; anonymous requests are sent to the login page.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state).ok_or_else(|| {
            let next = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            login_redirect(next)
        })
    }
}

/// The session if there is one. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|u| u.id)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_from_parts(parts, state)))
    }
}
