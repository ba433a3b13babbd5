pub mod models;
pub mod validation;
pub mod search;
pub mod repository;
pub mod marketplace;

pub use marketplace::{Marketplace, MarketplaceRules, TripDetail};
pub use models::{Aircraft, Booking, BookingStatus, Trip, TripStatus, User};
pub use repository::Repositories;
pub use validation::{FieldError, FieldErrors};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Access denied")]
    Forbidden,
    #[error("Owners cannot book a seat on their own trip")]
    OwnTrip,
    #[error("Booking interest already registered for this trip")]
    AlreadyRequested,
    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
