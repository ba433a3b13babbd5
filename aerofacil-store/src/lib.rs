pub mod app_config;
pub mod database;
pub mod trip_repo;
pub mod booking_repo;
pub mod aircraft_repo;
pub mod user_repo;
pub mod memory;

pub use database::DbClient;
pub use memory::MemoryStore;
