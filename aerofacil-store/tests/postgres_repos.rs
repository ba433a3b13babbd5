//! Integration tests for the Postgres repositories.
//!
//! Each test gets a fresh database with the migrations applied. They need a
//! running server, so they are ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p aerofacil-store --test postgres_repos -- --ignored
//! ```

use aerofacil_core::models::{AircraftDraft, Booking, BookingDraft, NewUser, TripDraft, User};
use aerofacil_core::search::{SearchParams, TripSearch};
use aerofacil_core::{CoreError, Marketplace, MarketplaceRules, Trip};
use aerofacil_store::DbClient;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()
}

fn marketplace(pool: PgPool) -> Marketplace {
    Marketplace::new(DbClient { pool }.repositories(), MarketplaceRules::default())
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        full_name: None,
        phone_number: None,
        is_owner: true,
        password_hash: "not-a-real-hash".to_string(),
    }
}

async fn user(marketplace: &Marketplace, username: &str) -> User {
    marketplace.repositories().users.create(new_user(username)).await.unwrap()
}

async fn trip(marketplace: &Marketplace, owner: &User, origin: &str, departure: DateTime<Utc>) -> Trip {
    let aircraft = marketplace
        .register_aircraft(owner.id, AircraftDraft { model_name: "Baron 58".into(), capacity: 5 })
        .await
        .unwrap();
    let draft = TripDraft {
        aircraft_id: aircraft.id,
        origin: origin.to_string(),
        destination: "Recife".to_string(),
        departure_time: departure,
        arrival_time: departure + Duration::hours(1),
        available_seats: 3,
        description: String::new(),
    };
    marketplace.create_trip(owner.id, draft).await.unwrap()
}

async fn origin_hits(marketplace: &Marketplace, origin: &str) -> Vec<String> {
    let search = TripSearch::from_params(&SearchParams {
        origin: Some(origin.into()),
        ..Default::default()
    });
    let page = marketplace.search_trips(&search, None, now()).await.unwrap();
    page.items.into_iter().map(|t| t.origin).collect()
}

async fn date_total(marketplace: &Marketplace, date: &str) -> u64 {
    let search = TripSearch::from_params(&SearchParams {
        date: Some(date.into()),
        ..Default::default()
    });
    marketplace.search_trips(&search, None, now()).await.unwrap().total
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../migrations")]
#[ignore = "needs a Postgres server at DATABASE_URL"]
async fn test_ilike_treats_wildcards_literally(pool: PgPool) {
    let marketplace = marketplace(pool);
    let owner = user(&marketplace, "owner").await;
    let departure = now() + Duration::days(2);
    trip(&marketplace, &owner, "Natal", departure).await;
    trip(&marketplace, &owner, "Hangar 50% Natal", departure).await;
    trip(&marketplace, &owner, "Pista_2 Recife", departure).await;
    trip(&marketplace, &owner, "C:\\Pista Sul", departure).await;

    assert_eq!(origin_hits(&marketplace, "%").await, vec!["Hangar 50% Natal"]);
    assert_eq!(origin_hits(&marketplace, "_").await, vec!["Pista_2 Recife"]);
    assert_eq!(origin_hits(&marketplace, "\\").await, vec!["C:\\Pista Sul"]);
    assert_eq!(origin_hits(&marketplace, "nATAL").await.len(), 2);
}

#[sqlx::test(migrations = "../migrations")]
#[ignore = "needs a Postgres server at DATABASE_URL"]
async fn test_date_filter_uses_utc_calendar_day(pool_opts: PgPoolOptions, connect_opts: PgConnectOptions) {
    // A session zone west of UTC puts 01:30Z on the previous local day.
    let connect_opts = connect_opts.options([("timezone", "America/Sao_Paulo")]);
    let pool = pool_opts.connect_with(connect_opts).await.unwrap();
    let marketplace = marketplace(pool);
    let owner = user(&marketplace, "owner").await;
    trip(&marketplace, &owner, "Natal", Utc.with_ymd_and_hms(2024, 5, 2, 1, 30, 0).unwrap()).await;
    trip(&marketplace, &owner, "Natal", Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap()).await;

    assert_eq!(date_total(&marketplace, "2024-05-02").await, 1);
    assert_eq!(date_total(&marketplace, "2024-05-01").await, 1);
    assert_eq!(date_total(&marketplace, "2024-04-30").await, 0);
}

// ---------------------------------------------------------------------------
// Unique constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../migrations")]
#[ignore = "needs a Postgres server at DATABASE_URL"]
async fn test_duplicate_booking_row_is_already_requested(pool: PgPool) {
    let marketplace = marketplace(pool);
    let owner = user(&marketplace, "owner").await;
    let passenger = user(&marketplace, "passenger").await;
    let trip = trip(&marketplace, &owner, "Natal", now() + Duration::days(2)).await;
    let draft = BookingDraft { seats_requested: 1, message_to_owner: String::new() };
    let bookings = &marketplace.repositories().bookings;

    // Two requests that both passed the existence check before either insert.
    bookings.insert(&Booking::new(trip.id, passenger.id, draft.clone())).await.unwrap();
    let second = bookings.insert(&Booking::new(trip.id, passenger.id, draft)).await;

    assert!(matches!(second, Err(CoreError::AlreadyRequested)), "got {second:?}");
    assert_eq!(bookings.list_for_trip(trip.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../migrations")]
#[ignore = "needs a Postgres server at DATABASE_URL"]
async fn test_taken_username_is_conflict(pool: PgPool) {
    let marketplace = marketplace(pool);
    user(&marketplace, "pilot").await;

    let again = marketplace.repositories().users.create(new_user("pilot")).await;
    assert!(matches!(again, Err(CoreError::Conflict(_))), "got {again:?}");
}
