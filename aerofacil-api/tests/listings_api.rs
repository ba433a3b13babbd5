//! Public pages: home, search with pagination, trip detail.

mod common;

use aerofacil_core::models::{TripChanges, TripDraft};
use aerofacil_core::{Trip, TripStatus};
use axum::http::StatusCode;
use common::{body_text, days_from_now, TestApp};
use uuid::Uuid;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_home_lists_five_soonest_upcoming_trips() {
    let app = TestApp::new();
    let owner = app.user("owner").await;

    let mut trips = Vec::new();
    for day in 1..=7 {
        trips.push(app.trip(&owner, "Natal", days_from_now(day)).await);
    }
    let past = app.trip(&owner, "Natal", days_from_now(-2)).await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    for trip in &trips[..5] {
        assert!(body.contains(&format!("/trips/{}", trip.id)));
    }
    for trip in &trips[5..] {
        assert!(!body.contains(&format!("/trips/{}", trip.id)));
    }
    assert!(!body.contains(&past.id.to_string()));
}

#[tokio::test]
async fn test_closed_trips_are_not_listed() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let trip = app.trip(&owner, "Natal", days_from_now(3)).await;

    let mut draft = trip_draft(&trip);
    draft.available_seats = 2;
    app.state
        .marketplace
        .update_trip(trip.id, owner.id, TripChanges { draft, status: TripStatus::Closed })
        .await
        .unwrap();

    let body = body_text(app.get("/", None).await).await;
    assert!(!body.contains(&trip.id.to_string()));
    let body = body_text(app.get("/trips", None).await).await;
    assert!(!body.contains(&trip.id.to_string()));
}

#[tokio::test]
async fn test_search_filters_by_origin_case_insensitively() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let natal = app.trip(&owner, "Natal", days_from_now(2)).await;
    let recife = app.trip(&owner, "Recife", days_from_now(2)).await;

    let response = app.get("/trips?origin=nAtA&destination=&date=", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    assert!(body.contains(&natal.id.to_string()));
    assert!(!body.contains(&recife.id.to_string()));
}

#[tokio::test]
async fn test_search_combines_origin_destination_and_date() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let departure = days_from_now(4);

    let hit = app.trip_to(&owner, "Natal", "Fernando de Noronha", departure).await;
    let wrong_origin = app.trip_to(&owner, "Recife", "Fernando de Noronha", departure).await;
    let wrong_destination = app.trip_to(&owner, "Natal", "Recife", departure).await;
    let wrong_day = app
        .trip_to(&owner, "Natal", "Fernando de Noronha", departure + chrono::Duration::days(1))
        .await;

    let uri = format!(
        "/trips?origin=natal&destination=NORONHA&date={}",
        departure.format("%Y-%m-%d")
    );
    let response = app.get(&uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    assert!(body.contains(&hit.id.to_string()));
    for miss in [&wrong_origin, &wrong_destination, &wrong_day] {
        assert!(!body.contains(&miss.id.to_string()));
    }
    assert!(body.contains("1 trip(s) found."));
}

#[tokio::test]
async fn test_search_percent_sign_is_literal() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let trip = app.trip(&owner, "Natal", days_from_now(2)).await;

    let response = app.get("/trips?origin=%25", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    assert!(!body.contains(&trip.id.to_string()));
    assert!(body.contains("0 trip(s) found."));
}

#[tokio::test]
async fn test_search_by_date_and_unparseable_date() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let departure = days_from_now(4);
    let trip = app.trip(&owner, "Natal", departure).await;

    let uri = format!("/trips?date={}", departure.format("%Y-%m-%d"));
    let body = body_text(app.get(&uri, None).await).await;
    assert!(body.contains(&trip.id.to_string()));

    let response = app.get("/trips?date=next-tuesday", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_text(response).await.contains(&trip.id.to_string()));
}

#[tokio::test]
async fn test_search_pages_by_ten() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    for day in 1..=12 {
        app.trip(&owner, "Natal", days_from_now(day)).await;
    }

    let first = body_text(app.get("/trips", None).await).await;
    assert!(first.contains("Page 1 of 2"));
    assert!(first.contains("12 trip(s) found."));

    let second = app.get("/trips?page=2", None).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert!(body_text(second).await.contains("Page 2 of 2"));

    assert_eq!(app.get("/trips?page=3", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/trips?page=zero", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/trips?page=0", None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_search_first_page_is_ok() {
    let app = TestApp::new();
    let response = app.get("/trips?origin=Nowhere", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("0 trip(s) found."));
}

#[tokio::test]
async fn test_trip_detail() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let trip = app.trip(&owner, "Natal", days_from_now(1)).await;

    let response = app.get(&format!("/trips/{}", trip.id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Natal"));
    assert!(body.contains("King Air C90"));
    assert!(body.contains(&format!("/trips/{}/book", trip.id)));
}

#[tokio::test]
async fn test_trip_detail_shows_owner_actions_to_owner() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let trip = app.trip(&owner, "Natal", days_from_now(1)).await;

    let cookie = app.session_for(&owner);
    let body = body_text(app.get(&format!("/trips/{}", trip.id), Some(&cookie)).await).await;
    assert!(body.contains(&format!("/trips/{}/edit", trip.id)));
}

#[tokio::test]
async fn test_missing_trip_is_not_found() {
    let app = TestApp::new();
    let response = app.get(&format!("/trips/{}", Uuid::new_v4()), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/trips/42", None).await.status(), StatusCode::NOT_FOUND);
}

fn trip_draft(trip: &Trip) -> TripDraft {
    TripDraft {
        aircraft_id: trip.aircraft_id,
        origin: trip.origin.clone(),
        destination: trip.destination.clone(),
        departure_time: trip.departure_time,
        arrival_time: trip.arrival_time,
        available_seats: trip.available_seats,
        description: trip.description.clone(),
    }
}
