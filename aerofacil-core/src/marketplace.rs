//! Listing, booking and owner operations of the marketplace.
//!
//! Handlers resolve the session into an optional user id and call into
//! [`Marketplace`]; everything that decides *whether* an operation may happen
//! lives here so it holds regardless of the transport.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Aircraft, AircraftDraft, Booking, BookingDraft, Trip, TripChanges, TripDraft, User,
};
use crate::repository::Repositories;
use crate::search::{page_count, Page, PageRequest, TripSearch};
use crate::validation::FieldErrors;
use crate::{CoreError, CoreResult};

/// Listing sizes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarketplaceRules {
    #[serde(default = "default_home_limit")]
    pub home_limit: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_home_limit() -> u32 { 5 }
fn default_page_size() -> u32 { 10 }

impl Default for MarketplaceRules {
    fn default() -> Self {
        Self { home_limit: default_home_limit(), page_size: default_page_size() }
    }
}

/// A trip with the records its detail page shows.
#[derive(Debug, Clone)]
pub struct TripDetail {
    pub trip: Trip,
    pub aircraft: Option<Aircraft>,
    pub owner: Option<User>,
}

#[derive(Clone)]
pub struct Marketplace {
    repos: Repositories,
    rules: MarketplaceRules,
}

impl Marketplace {
    pub fn new(repos: Repositories, rules: MarketplaceRules) -> Self {
        Self { repos, rules }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    // ========================================================================
    // Public listings
    // ========================================================================

    pub async fn upcoming_trips(&self, now: DateTime<Utc>) -> CoreResult<Vec<Trip>> {
        self.repos.trips.upcoming(now, self.rules.home_limit).await
    }

    pub async fn search_trips(
        &self,
        search: &TripSearch,
        page: Option<&str>,
        now: DateTime<Utc>,
    ) -> CoreResult<Page<Trip>> {
        let request = PageRequest::parse(page, self.rules.page_size)?;
        let (items, total) = self.repos.trips.search(search, now, request).await?;

        if request.number > page_count(total, request.size) {
            return Err(CoreError::NotFound("Page"));
        }

        Ok(Page { items, number: request.number, size: request.size, total })
    }

    pub async fn trip(&self, id: Uuid) -> CoreResult<Trip> {
        self.repos.trips.get(id).await?.ok_or(CoreError::NotFound("Trip"))
    }

    pub async fn trip_detail(&self, id: Uuid) -> CoreResult<TripDetail> {
        let trip = self.trip(id).await?;
        let aircraft = self.repos.aircraft.get(trip.aircraft_id).await?;
        let owner = self.repos.users.get(trip.owner_id).await?;
        Ok(TripDetail { trip, aircraft, owner })
    }

    // ========================================================================
    // Booking interest
    // ========================================================================

    /// Registers `requester`'s interest in a trip.
    ///
    /// Checks run in order and the first failure wins: the trip must exist,
    /// the requester must be signed in, must not own the trip, and must not
    /// have asked before. Only then is the form itself validated.
    pub async fn request_booking(
        &self,
        trip_id: Uuid,
        requester: Option<Uuid>,
        draft: BookingDraft,
    ) -> CoreResult<Booking> {
        let trip = self.trip(trip_id).await?;
        let passenger_id = requester.ok_or(CoreError::Unauthenticated)?;

        if trip.is_owned_by(passenger_id) {
            return Err(CoreError::OwnTrip);
        }
        if self.repos.bookings.exists(trip.id, passenger_id).await? {
            return Err(CoreError::AlreadyRequested);
        }
        draft.validate().map_err(CoreError::Invalid)?;

        let booking = Booking::new(trip.id, passenger_id, draft);
        self.repos.bookings.insert(&booking).await?;
        info!("Booking {} registered on trip {} by {}", booking.id, trip.id, passenger_id);
        Ok(booking)
    }

    /// Interest registered on a trip, oldest first. Owner only.
    pub async fn trip_bookings(&self, trip_id: Uuid, user_id: Uuid) -> CoreResult<Vec<Booking>> {
        let trip = self.owned_trip(trip_id, user_id).await?;
        self.repos.bookings.list_for_trip(trip.id).await
    }

    // ========================================================================
    // Owner dashboard
    // ========================================================================

    pub async fn owner_trips(&self, owner_id: Uuid) -> CoreResult<Vec<Trip>> {
        self.repos.trips.list_by_owner(owner_id).await
    }

    /// Aircraft a user may attach to a trip: only their own.
    pub async fn aircraft_choices(&self, owner_id: Uuid) -> CoreResult<Vec<Aircraft>> {
        self.repos.aircraft.list_by_owner(owner_id).await
    }

    pub async fn create_trip(&self, owner_id: Uuid, draft: TripDraft) -> CoreResult<Trip> {
        self.validate_trip_draft(owner_id, &draft).await?;

        let trip = Trip::new(owner_id, draft);
        self.repos.trips.insert(&trip).await?;
        info!("Trip {} created by {}", trip.id, owner_id);
        Ok(trip)
    }

    /// Loads a trip for editing. Missing trips are reported before ownership.
    pub async fn owned_trip(&self, trip_id: Uuid, user_id: Uuid) -> CoreResult<Trip> {
        let trip = self.trip(trip_id).await?;
        if !trip.is_owned_by(user_id) {
            return Err(CoreError::Forbidden);
        }
        Ok(trip)
    }

    pub async fn update_trip(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        changes: TripChanges,
    ) -> CoreResult<Trip> {
        let mut trip = self.owned_trip(trip_id, user_id).await?;
        self.validate_trip_draft(user_id, &changes.draft).await?;

        trip.apply(changes);
        self.repos.trips.update(&trip).await?;
        info!("Trip {} updated by {} (status {})", trip.id, user_id, trip.status);
        Ok(trip)
    }

    pub async fn delete_trip(&self, trip_id: Uuid, user_id: Uuid) -> CoreResult<Trip> {
        let trip = self.owned_trip(trip_id, user_id).await?;
        if !self.repos.trips.delete(trip.id).await? {
            return Err(CoreError::NotFound("Trip"));
        }
        info!("Trip {} deleted by {}", trip.id, user_id);
        Ok(trip)
    }

    async fn validate_trip_draft(&self, owner_id: Uuid, draft: &TripDraft) -> CoreResult<()> {
        let mut errors = match draft.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => errors,
        };

        let owns_aircraft = self
            .repos
            .aircraft
            .get(draft.aircraft_id)
            .await?
            .is_some_and(|aircraft| aircraft.owner_id == owner_id);
        if !owns_aircraft {
            errors.add("aircraft", "Select a valid choice. That choice is not one of the available choices.");
        }

        errors.into_result().map_err(CoreError::Invalid)
    }

    // ========================================================================
    // Aircraft
    // ========================================================================

    pub async fn register_aircraft(&self, owner_id: Uuid, draft: AircraftDraft) -> CoreResult<Aircraft> {
        draft.validate().map_err(CoreError::Invalid)?;
        let aircraft = Aircraft::new(owner_id, draft);
        self.repos.aircraft.insert(&aircraft).await?;
        info!("Aircraft {} registered by {}", aircraft.id, owner_id);
        Ok(aircraft)
    }
}
