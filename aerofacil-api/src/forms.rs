//! Submitted HTML forms.
//!
//! Every field arrives as text so malformed input becomes a field error on
//! the re-rendered page rather than a bare extractor rejection.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use aerofacil_core::models::{AircraftDraft, BookingDraft, Trip, TripChanges, TripDraft, TripStatus};
use aerofacil_core::FieldErrors;

const FORM_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const ACCEPTED_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub fn error_messages(errors: &FieldErrors) -> Vec<String> {
    errors.iter().map(|e| format!("{}: {}", e.field.replace('_', " "), e.message)).collect()
}

/// `datetime-local` values carry no zone; they are taken as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    ACCEPTED_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Trips
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripForm {
    #[serde(default)]
    pub aircraft: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub available_seats: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

impl TripForm {
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            aircraft: trip.aircraft_id.to_string(),
            origin: trip.origin.clone(),
            destination: trip.destination.clone(),
            departure_time: trip.departure_time.format(FORM_DATETIME_FORMAT).to_string(),
            arrival_time: trip.arrival_time.format(FORM_DATETIME_FORMAT).to_string(),
            available_seats: trip.available_seats.to_string(),
            description: trip.description.clone(),
            status: trip.status.as_str().to_string(),
        }
    }

    pub fn to_draft(&self) -> Result<TripDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let aircraft_id = Uuid::parse_str(self.aircraft.trim()).ok();
        if aircraft_id.is_none() {
            errors.add("aircraft", "Select a valid choice.");
        }

        let departure_time = parse_datetime(&self.departure_time);
        if departure_time.is_none() {
            errors.add("departure_time", "Enter a valid date/time.");
        }
        let arrival_time = parse_datetime(&self.arrival_time);
        if arrival_time.is_none() {
            errors.add("arrival_time", "Enter a valid date/time.");
        }

        let available_seats = self.available_seats.trim().parse::<i32>().ok();
        if available_seats.is_none() {
            errors.add("available_seats", "Enter a whole number.");
        }

        match (aircraft_id, departure_time, arrival_time, available_seats) {
            (Some(aircraft_id), Some(departure_time), Some(arrival_time), Some(available_seats)) => {
                errors.into_result()?;
                Ok(TripDraft {
                    aircraft_id,
                    origin: self.origin.trim().to_string(),
                    destination: self.destination.trim().to_string(),
                    departure_time,
                    arrival_time,
                    available_seats,
                    description: self.description.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }

    pub fn to_changes(&self) -> Result<TripChanges, FieldErrors> {
        let status = self.status.parse::<TripStatus>();
        match (self.to_draft(), status) {
            (Ok(draft), Ok(status)) => Ok(TripChanges { draft, status }),
            (draft, status) => {
                let mut errors = draft.err().unwrap_or_default();
                if status.is_err() {
                    errors.add("status", "Select a valid choice.");
                }
                Err(errors)
            }
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookingForm {
    #[serde(default = "default_seats")]
    pub seats_requested: String,
    #[serde(default)]
    pub message_to_owner: String,
}

fn default_seats() -> String {
    "1".to_string()
}

impl Default for BookingForm {
    fn default() -> Self {
        Self { seats_requested: default_seats(), message_to_owner: String::new() }
    }
}

impl BookingForm {
    /// Unparseable seat counts become 0, which the draft validation rejects.
    pub fn to_draft(&self) -> BookingDraft {
        BookingDraft {
            seats_requested: self.seats_requested.trim().parse().unwrap_or(0),
            message_to_owner: self.message_to_owner.trim().to_string(),
        }
    }
}

// ============================================================================
// Aircraft and accounts
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AircraftForm {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub capacity: String,
}

impl AircraftForm {
    pub fn to_draft(&self) -> Result<AircraftDraft, FieldErrors> {
        let capacity = self
            .capacity
            .trim()
            .parse::<i32>()
            .map_err(|_| FieldErrors::single("capacity", "Enter a whole number."))?;
        Ok(AircraftDraft { model_name: self.model_name.trim().to_string(), capacity })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: String,
    /// Checkbox: present (`on`) when ticked.
    #[serde(default)]
    pub is_owner: Option<String>,
}

impl RegisterForm {
    pub fn wants_owner(&self) -> bool {
        self.is_owner.is_some()
    }
}

/// Only same-site paths are followed after login.
pub fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\") {
        next
    } else {
        "/"
    }
}
