use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use uuid::Uuid;

use aerofacil_core::search::{SearchParams, TripSearch};
use crate::error::AppError;
use crate::flash;
use crate::middleware::MaybeUser;
use crate::state::AppState;
use crate::views::{
    render, trip_cards, Chrome, HomeTemplate, InterestRow, TripCard, TripDetailTemplate, TripListTemplate,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/trips", get(search_trips))
        .route("/trips/{id}", get(trip_detail))
}

/// Identifiers that are not UUIDs can never name a trip.
pub fn parse_trip_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Trip".to_string()))
}

/// GET /
async fn home(
    State(state): State<AppState>,
    jar: CookieJar,
    user: MaybeUser,
) -> Result<(CookieJar, Html<String>), AppError> {
    let trips = state.marketplace.upcoming_trips(Utc::now()).await?;

    let (jar, flashes) = flash::take(jar);
    let page = render(HomeTemplate {
        chrome: Chrome::new(user.0.as_ref(), flashes),
        trips: trip_cards(&trips),
    })?;
    Ok((jar, page))
}

/// GET /trips?origin=&destination=&date=&page=
async fn search_trips(
    State(state): State<AppState>,
    jar: CookieJar,
    user: MaybeUser,
    Query(params): Query<SearchParams>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let search = TripSearch::from_params(&params);
    let page = state
        .marketplace
        .search_trips(&search, params.page.as_deref(), Utc::now())
        .await?;

    let origin = params.origin.unwrap_or_default();
    let destination = params.destination.unwrap_or_default();
    let date = params.date.unwrap_or_default();
    let page_url = |number: u32| {
        format!(
            "/trips?origin={}&destination={}&date={}&page={}",
            urlencoding::encode(&origin),
            urlencoding::encode(&destination),
            urlencoding::encode(&date),
            number
        )
    };
    let previous_url = page_url(page.number.saturating_sub(1).max(1));
    let next_url = page_url(page.number + 1);

    let (jar, flashes) = flash::take(jar);
    let body = render(TripListTemplate {
        chrome: Chrome::new(user.0.as_ref(), flashes),
        trips: trip_cards(&page.items),
        total: page.total,
        page_number: page.number,
        num_pages: page.num_pages(),
        has_previous: page.has_previous(),
        has_next: page.has_next(),
        previous_url,
        next_url,
        origin,
        destination,
        date,
    })?;
    Ok((jar, body))
}

/// GET /trips/{id}
async fn trip_detail(
    State(state): State<AppState>,
    jar: CookieJar,
    user: MaybeUser,
    Path(id): Path<String>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let detail = state.marketplace.trip_detail(parse_trip_id(&id)?).await?;

    let is_owner = user.id().is_some_and(|uid| detail.trip.is_owned_by(uid));
    let interest = match user.id() {
        Some(uid) if is_owner => interest_rows(&state, detail.trip.id, uid).await?,
        _ => Vec::new(),
    };

    let (jar, flashes) = flash::take(jar);
    let body = render(TripDetailTemplate {
        chrome: Chrome::new(user.0.as_ref(), flashes),
        trip: TripCard::from(&detail.trip),
        aircraft_model: detail.aircraft.map(|a| a.model_name).unwrap_or_default(),
        owner_name: detail.owner.map(|o| o.display_name().to_string()).unwrap_or_default(),
        is_owner,
        interest,
    })?;
    Ok((jar, body))
}

async fn interest_rows(state: &AppState, trip_id: Uuid, owner_id: Uuid) -> Result<Vec<InterestRow>, AppError> {
    let bookings = state.marketplace.trip_bookings(trip_id, owner_id).await?;

    let mut rows = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let passenger = state
            .users
            .get(booking.passenger_id)
            .await?
            .map(|u| u.display_name().to_string())
            .unwrap_or_default();
        rows.push(InterestRow {
            passenger,
            seats_requested: booking.seats_requested,
            message: booking.message_to_owner,
            status: booking.status.to_string(),
        });
    }
    Ok(rows)
}
