#![allow(dead_code)]

use aerofacil_api::auth::password::hash_password;
use aerofacil_api::auth::session::{issue_token, SESSION_COOKIE};
use aerofacil_api::flash::{self, Flash, FLASH_COOKIE};
use aerofacil_api::{app, AppState, AuthConfig};
use aerofacil_core::models::{AircraftDraft, NewUser, TripDraft};
use aerofacil_core::{MarketplaceRules, Trip, User};
use aerofacil_store::MemoryStore;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

/// The full router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let state = AppState::new(
            store.repositories(),
            MarketplaceRules::default(),
            AuthConfig {
                secret: "integration-test-secret".to_string(),
                expiration: 3600,
                secure_cookies: false,
            },
        );
        Self { router: app(state.clone()), state, store }
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    pub async fn user(&self, username: &str) -> User {
        let password_hash = hash_password(PASSWORD).expect("hashing should succeed");
        self.state
            .users
            .create(NewUser {
                username: username.to_string(),
                full_name: None,
                phone_number: None,
                is_owner: true,
                password_hash,
            })
            .await
            .expect("user creation should succeed")
    }

    pub async fn aircraft(&self, owner: &User) -> Uuid {
        self.state
            .marketplace
            .register_aircraft(owner.id, AircraftDraft { model_name: "King Air C90".into(), capacity: 6 })
            .await
            .expect("aircraft registration should succeed")
            .id
    }

    pub async fn trip(&self, owner: &User, origin: &str, departure: DateTime<Utc>) -> Trip {
        self.trip_to(owner, origin, "Fernando de Noronha", departure).await
    }

    pub async fn trip_to(&self, owner: &User, origin: &str, destination: &str, departure: DateTime<Utc>) -> Trip {
        let aircraft_id = self.aircraft(owner).await;
        self.state
            .marketplace
            .create_trip(
                owner.id,
                TripDraft {
                    aircraft_id,
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    departure_time: departure,
                    arrival_time: departure + Duration::hours(1),
                    available_seats: 3,
                    description: String::new(),
                },
            )
            .await
            .expect("trip creation should succeed")
    }

    pub async fn stored_trip(&self, id: Uuid) -> Option<Trip> {
        self.state.marketplace.repositories().trips.get(id).await.expect("lookup should succeed")
    }

    /// A `Cookie` header value carrying a session for `user`.
    pub fn session_for(&self, user: &User) -> String {
        let token = issue_token(&self.state.auth, user).expect("token should encode");
        format!("{}={}", SESSION_COOKIE, token)
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)], cookie: Option<&str>) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn get_bearer(&self, uri: &str, user: &User) -> Response<Body> {
        let token = issue_token(&self.state.auth, user).expect("token should encode");
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("response should redirect")
}

/// Asserts a 303 to `target`.
pub fn assert_redirect(response: &Response<Body>, target: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), target);
}

/// Value of the `name` cookie set by the response, if any.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(|v| v[prefix.len()..].split(';').next().unwrap_or_default().to_string())
}

pub fn flashes(response: &Response<Body>) -> Vec<Flash> {
    set_cookie(response, FLASH_COOKIE).map(|value| flash::decode(&value)).unwrap_or_default()
}

pub fn login_url(next: &str) -> String {
    format!("/login?next={}", urlencoding::encode(next))
}

pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}
