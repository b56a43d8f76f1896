use async_trait::async_trait;
use uuid::Uuid;
use seatline_shared::{Booking, BookingDetails, SeatAssignment, User, UserIdentity};
use crate::StoreResult;

/// Durable record of users and their tickets.
///
/// Implementations only persist; seat uniqueness and the one-booking-per-user
/// rule are decided by the caller before a write reaches the store.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user_by_identity(&self, identity: &UserIdentity) -> StoreResult<Option<User>>;

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()>;

    async fn find_booking_by_user_and_route(
        &self,
        user_id: Uuid,
        from: &str,
        to: &str,
    ) -> StoreResult<Option<Booking>>;

    /// The single live booking held by a user
    async fn find_booking_by_user(&self, user_id: Uuid) -> StoreResult<Option<Booking>>;

    /// Every booking in a section, joined with its owner
    async fn list_bookings_by_section(&self, section: &str) -> StoreResult<Vec<BookingDetails>>;

    /// Every live booking, whatever its section
    async fn list_bookings(&self) -> StoreResult<Vec<Booking>>;

    async fn update_booking_seat(&self, booking_id: Uuid, assignment: &SeatAssignment) -> StoreResult<()>;

    async fn delete_booking(&self, booking_id: Uuid) -> StoreResult<()>;
}
