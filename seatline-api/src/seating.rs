use axum::{extract::State, routing::get, Json, Router};
use seatline_seating::SectionOccupancy;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/seating", get(occupancy))
}

/// Per-section capacity and held seats
async fn occupancy(State(state): State<AppState>) -> Json<Vec<SectionOccupancy>> {
    Json(state.bookings.occupancy())
}
