use serde::{Deserialize, Serialize};
use seatline_shared::UserIdentity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub from: String,
    pub to: String,
    pub price: i32,
    pub user: UserIdentity,
}

impl CreateBookingRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, price: i32, user: UserIdentity) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            price,
            user,
        }
    }
}

/// Move a user's booking to a named seat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatModificationRequest {
    pub user: UserIdentity,
    pub section: String,
    pub seat: u32,
}

/// Outcome of rebuilding occupancy from stored bookings
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReconcileReport {
    pub restored: usize,
    pub skipped: usize,
}
