pub mod app_config;
pub mod database;
pub mod booking_repo;
pub mod memory;

pub use database::DbClient;
pub use booking_repo::PgBookingStore;
pub use memory::InMemoryBookingStore;
