use std::sync::Arc;
use seatline_booking::BookingOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<BookingOrchestrator>,
}
