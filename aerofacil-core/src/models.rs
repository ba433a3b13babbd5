use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::validation::{check_text, FieldErrors};

pub const MAX_PLACE_CHARS: usize = 100;
pub const MAX_MODEL_NAME_CHARS: usize = 100;
pub const MAX_AIRCRAFT_CAPACITY: i32 = 20;

// ============================================================================
// Status enums
// ============================================================================

/// Lifecycle of a trip listing. Owners may set any value at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    #[default]
    Open,
    Closed,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Open,
        TripStatus::Closed,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Open => "OPEN",
            TripStatus::Closed => "CLOSED",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TripStatus::Open => "Open for booking interest",
            TripStatus::Closed => "Closed",
            TripStatus::Completed => "Completed",
            TripStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown trip status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A marketplace account. Passengers and aircraft owners share this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_owner: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub model_name: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl Aircraft {
    pub fn new(owner_id: Uuid, draft: AircraftDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            model_name: draft.model_name,
            capacity: draft.capacity,
            created_at: Utc::now(),
        }
    }
}

/// A flight offered by its owner with seats open to booking interest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub aircraft_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub available_seats: i32,
    pub description: String,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(owner_id: Uuid, draft: TripDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            aircraft_id: draft.aircraft_id,
            origin: draft.origin,
            destination: draft.destination,
            departure_time: draft.departure_time,
            arrival_time: draft.arrival_time,
            available_seats: draft.available_seats,
            description: draft.description,
            status: TripStatus::Open,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Public listings only show open trips that have not departed yet.
    pub fn is_listed(&self, now: DateTime<Utc>) -> bool {
        self.status == TripStatus::Open && self.departure_time >= now
    }

    pub fn apply(&mut self, changes: TripChanges) {
        let TripChanges { draft, status } = changes;
        self.aircraft_id = draft.aircraft_id;
        self.origin = draft.origin;
        self.destination = draft.destination;
        self.departure_time = draft.departure_time;
        self.arrival_time = draft.arrival_time;
        self.available_seats = draft.available_seats;
        self.description = draft.description;
        self.status = status;
    }
}

/// A passenger's request for seats on a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub passenger_id: Uuid,
    pub seats_requested: i32,
    pub message_to_owner: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(trip_id: Uuid, passenger_id: Uuid, draft: BookingDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            passenger_id,
            seats_requested: draft.seats_requested,
            message_to_owner: draft.message_to_owner,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Drafts (validated user input)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TripDraft {
    pub aircraft_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub available_seats: i32,
    pub description: String,
}

impl TripDraft {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "origin", &self.origin, MAX_PLACE_CHARS);
        check_text(&mut errors, "destination", &self.destination, MAX_PLACE_CHARS);
        if self.available_seats < 1 {
            errors.add("available_seats", "Ensure this value is greater than or equal to 1.");
        }
        if self.arrival_time < self.departure_time {
            errors.add("arrival_time", "Arrival cannot be earlier than departure.");
        }
        errors.into_result()
    }
}

/// Edits an owner may make; the create fields plus the status.
#[derive(Debug, Clone, PartialEq)]
pub struct TripChanges {
    pub draft: TripDraft,
    pub status: TripStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub seats_requested: i32,
    pub message_to_owner: String,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self { seats_requested: 1, message_to_owner: String::new() }
    }
}

impl BookingDraft {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.seats_requested < 1 {
            errors.add("seats_requested", "Enter a whole number of seats, at least 1.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AircraftDraft {
    pub model_name: String,
    pub capacity: i32,
}

impl AircraftDraft {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "model_name", &self.model_name, MAX_MODEL_NAME_CHARS);
        if !(1..=MAX_AIRCRAFT_CAPACITY).contains(&self.capacity) {
            errors.add(
                "capacity",
                format!("Capacity must be between 1 and {} passengers.", MAX_AIRCRAFT_CAPACITY),
            );
        }
        errors.into_result()
    }
}

/// Account data ready to persist; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_owner: bool,
    pub password_hash: String,
}

impl NewUser {
    pub fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            username: self.username,
            full_name: self.full_name,
            phone_number: self.phone_number,
            is_owner: self.is_owner,
            password_hash: self.password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Username rules: 3 to 150 characters of letters, digits and `@.+_-`.
pub fn validate_username(username: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let len = username.chars().count();
    if !(3..=150).contains(&len) {
        errors.add("username", "Username must be between 3 and 150 characters.");
    } else if !username.chars().all(|c| c.is_ascii_alphanumeric() || "@.+_-".contains(c)) {
        errors.add("username", "Use only letters, digits and @/./+/-/_ characters.");
    }
    errors.into_result()
}
