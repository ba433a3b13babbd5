//! Page templates and the flattened view models they render.

use askama::Template;
use axum::response::Html;

use aerofacil_core::models::{Aircraft, Trip, TripStatus};
use crate::error::AppError;
use crate::flash::Flash;
use crate::forms::TripForm;
use crate::middleware::CurrentUser;

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn render<T: Template>(template: T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

// ============================================================================
// Shared layout
// ============================================================================

/// Navigation and flash area shared by every page.
pub struct Chrome {
    pub signed_in: bool,
    /// False when the page is built without looking at the session, so the
    /// nav can show neither the account links nor the sign-in links.
    pub session_known: bool,
    pub username: String,
    pub flashes: Vec<Flash>,
}

impl Chrome {
    pub fn new(user: Option<&CurrentUser>, flashes: Vec<Flash>) -> Self {
        Self {
            signed_in: user.is_some(),
            session_known: true,
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            flashes,
        }
    }

    /// Chrome for error pages, which are rendered outside any handler.
    pub fn sessionless() -> Self {
        Self { session_known: false, ..Self::new(None, Vec::new()) }
    }
}

// ============================================================================
// View models
// ============================================================================

pub struct TripCard {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub available_seats: i32,
    pub status: String,
    pub status_label: String,
    pub description: String,
}

impl From<&Trip> for TripCard {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id.to_string(),
            origin: trip.origin.clone(),
            destination: trip.destination.clone(),
            departure: trip.departure_time.format(DISPLAY_FORMAT).to_string(),
            arrival: trip.arrival_time.format(DISPLAY_FORMAT).to_string(),
            available_seats: trip.available_seats,
            status: trip.status.as_str().to_string(),
            status_label: trip.status.label().to_string(),
            description: trip.description.clone(),
        }
    }
}

pub fn trip_cards(trips: &[Trip]) -> Vec<TripCard> {
    trips.iter().map(TripCard::from).collect()
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub fn aircraft_options(aircraft: &[Aircraft], selected: &str) -> Vec<SelectOption> {
    aircraft
        .iter()
        .map(|a| {
            let value = a.id.to_string();
            SelectOption {
                selected: value == selected,
                label: format!("{} ({} seats)", a.model_name, a.capacity),
                value,
            }
        })
        .collect()
}

pub fn status_options(selected: &str) -> Vec<SelectOption> {
    TripStatus::ALL
        .iter()
        .map(|s| SelectOption {
            value: s.as_str().to_string(),
            label: s.label().to_string(),
            selected: s.as_str() == selected,
        })
        .collect()
}

/// One passenger's request as the trip owner sees it.
pub struct InterestRow {
    pub passenger: String,
    pub seats_requested: i32,
    pub message: String,
    pub status: String,
}

pub struct AircraftRow {
    pub model_name: String,
    pub capacity: i32,
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub trips: Vec<TripCard>,
}

#[derive(Template)]
#[template(path = "trips.html")]
pub struct TripListTemplate {
    pub chrome: Chrome,
    pub trips: Vec<TripCard>,
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub total: u64,
    pub page_number: u32,
    pub num_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_url: String,
    pub next_url: String,
}

#[derive(Template)]
#[template(path = "trip_detail.html")]
pub struct TripDetailTemplate {
    pub chrome: Chrome,
    pub trip: TripCard,
    pub aircraft_model: String,
    pub owner_name: String,
    pub is_owner: bool,
    pub interest: Vec<InterestRow>,
}

#[derive(Template)]
#[template(path = "booking_form.html")]
pub struct BookingFormTemplate {
    pub chrome: Chrome,
    pub trip: TripCard,
    pub seats_requested: String,
    pub message_to_owner: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub trips: Vec<TripCard>,
    pub has_aircraft: bool,
}

#[derive(Template)]
#[template(path = "trip_form.html")]
pub struct TripFormTemplate {
    pub chrome: Chrome,
    pub heading: String,
    pub action: String,
    pub form: TripForm,
    pub aircraft_options: Vec<SelectOption>,
    pub status_options: Vec<SelectOption>,
    pub show_status: bool,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "trip_confirm_delete.html")]
pub struct TripDeleteTemplate {
    pub chrome: Chrome,
    pub trip: TripCard,
}

#[derive(Template)]
#[template(path = "aircraft_list.html")]
pub struct AircraftListTemplate {
    pub chrome: Chrome,
    pub aircraft: Vec<AircraftRow>,
}

#[derive(Template)]
#[template(path = "aircraft_form.html")]
pub struct AircraftFormTemplate {
    pub chrome: Chrome,
    pub model_name: String,
    pub capacity: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub username: String,
    pub next: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub chrome: Chrome,
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub is_owner: bool,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub chrome: Chrome,
    pub status: u16,
    pub message: String,
}
