//! In-process repositories backed by hash maps.
//!
//! Used by the test suites and by `storage.backend = "memory"` runs. Every
//! check-then-write happens under a single write lock, so the uniqueness rules
//! the database enforces with constraints hold here too.

use aerofacil_core::models::{Aircraft, Booking, NewUser, Trip, User};
use aerofacil_core::repository::{
    AircraftRepository, BookingRepository, Repositories, TripRepository, UserRepository,
};
use aerofacil_core::search::{PageRequest, TripSearch};
use aerofacil_core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    aircraft: HashMap<Uuid, Aircraft>,
    trips: HashMap<Uuid, Trip>,
    bookings: HashMap<Uuid, Booking>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            trips: Arc::new(self.clone()),
            bookings: Arc::new(self.clone()),
            aircraft: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
        }
    }

    pub async fn booking_count(&self) -> usize {
        self.tables.read().await.bookings.len()
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn upcoming(&self, now: DateTime<Utc>, limit: u32) -> CoreResult<Vec<Trip>> {
        let tables = self.tables.read().await;
        let mut trips: Vec<Trip> = tables.trips.values().filter(|t| t.is_listed(now)).cloned().collect();
        trips.sort_by_key(|t| (t.departure_time, t.id));
        trips.truncate(limit as usize);
        Ok(trips)
    }

    async fn search(
        &self,
        search: &TripSearch,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> CoreResult<(Vec<Trip>, u64)> {
        let tables = self.tables.read().await;
        let mut trips: Vec<&Trip> = tables.trips.values().filter(|t| search.matches(t, now)).collect();
        trips.sort_by_key(|t| (t.departure_time, t.id));

        let total = trips.len() as u64;
        let items = trips
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Trip>> {
        Ok(self.tables.read().await.trips.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> CoreResult<Vec<Trip>> {
        let tables = self.tables.read().await;
        let mut trips: Vec<Trip> = tables.trips.values().filter(|t| t.owner_id == owner_id).cloned().collect();
        trips.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));
        Ok(trips)
    }

    async fn insert(&self, trip: &Trip) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.aircraft.contains_key(&trip.aircraft_id) {
            return Err(CoreError::Storage(format!("aircraft {} does not exist", trip.aircraft_id)));
        }
        tables.trips.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn update(&self, trip: &Trip) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.trips.get_mut(&trip.id) {
            Some(existing) => {
                *existing = trip.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound("Trip")),
        }
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.trips.remove(&id).is_none() {
            return Ok(false);
        }
        tables.bookings.retain(|_, b| b.trip_id != id);
        Ok(true)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn exists(&self, trip_id: Uuid, passenger_id: Uuid) -> CoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.values().any(|b| b.trip_id == trip_id && b.passenger_id == passenger_id))
    }

    async fn insert(&self, booking: &Booking) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.trips.contains_key(&booking.trip_id) {
            return Err(CoreError::NotFound("Trip"));
        }
        let duplicate = tables
            .bookings
            .values()
            .any(|b| b.trip_id == booking.trip_id && b.passenger_id == booking.passenger_id);
        if duplicate {
            return Err(CoreError::AlreadyRequested);
        }
        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn list_for_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables.bookings.values().filter(|b| b.trip_id == trip_id).cloned().collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }
}

#[async_trait]
impl AircraftRepository for MemoryStore {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Aircraft>> {
        Ok(self.tables.read().await.aircraft.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> CoreResult<Vec<Aircraft>> {
        let tables = self.tables.read().await;
        let mut aircraft: Vec<Aircraft> = tables.aircraft.values().filter(|a| a.owner_id == owner_id).cloned().collect();
        aircraft.sort_by(|a, b| a.model_name.cmp(&b.model_name));
        Ok(aircraft)
    }

    async fn insert(&self, aircraft: &Aircraft) -> CoreResult<()> {
        self.tables.write().await.aircraft.insert(aircraft.id, aircraft.clone());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(CoreError::Conflict(format!("username {} is already taken", user.username)));
        }
        let user = user.into_user();
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}
