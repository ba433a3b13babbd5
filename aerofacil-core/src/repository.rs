use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Aircraft, Booking, NewUser, Trip, User};
use crate::search::{PageRequest, TripSearch};
use crate::CoreResult;

/// Repository trait for trip listings
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Open trips departing at or after `now`, soonest first.
    async fn upcoming(&self, now: DateTime<Utc>, limit: u32) -> CoreResult<Vec<Trip>>;

    /// One page of listed trips matching `search`, soonest first, with the total match count.
    async fn search(
        &self,
        search: &TripSearch,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> CoreResult<(Vec<Trip>, u64)>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<Trip>>;

    /// Trips offered by `owner_id`, latest departure first.
    async fn list_by_owner(&self, owner_id: Uuid) -> CoreResult<Vec<Trip>>;

    async fn insert(&self, trip: &Trip) -> CoreResult<()>;

    async fn update(&self, trip: &Trip) -> CoreResult<()>;

    /// Removes the trip and its bookings. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for booking requests
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn exists(&self, trip_id: Uuid, passenger_id: Uuid) -> CoreResult<bool>;

    /// Fails with `CoreError::AlreadyRequested` if the passenger already has a
    /// booking on the trip, however the race was lost.
    async fn insert(&self, booking: &Booking) -> CoreResult<()>;

    async fn list_for_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Booking>>;
}

/// Repository trait for aircraft records
#[async_trait]
pub trait AircraftRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Aircraft>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> CoreResult<Vec<Aircraft>>;

    async fn insert(&self, aircraft: &Aircraft) -> CoreResult<()>;
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> CoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> CoreResult<Option<User>>;

    /// Fails with `CoreError::Conflict` when the username is taken.
    async fn create(&self, user: NewUser) -> CoreResult<User>;
}

/// The full set of repositories a running service needs.
#[derive(Clone)]
pub struct Repositories {
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub aircraft: Arc<dyn AircraftRepository>,
    pub users: Arc<dyn UserRepository>,
}
