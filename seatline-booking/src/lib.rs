pub mod models;
pub mod orchestrator;

pub use models::{CreateBookingRequest, ReconcileReport, SeatModificationRequest};
pub use orchestrator::{BookingError, BookingOrchestrator, BookingResult};
