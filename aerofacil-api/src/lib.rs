use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod aircraft;
pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod error;
pub mod flash;
pub mod forms;
pub mod listings;
pub mod middleware;
pub mod state;
pub mod views;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(listings::routes())
        .merge(bookings::routes())
        .merge(dashboard::routes())
        .merge(aircraft::routes())
        .merge(auth::routes())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
