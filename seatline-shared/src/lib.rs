pub mod models;
pub mod pii;

pub use models::{Booking, BookingDetails, SeatAssignment, User, UserIdentity};
pub use pii::Masked;
