use axum::{
    extract::{Path, State, Json},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use seatline_booking::{CreateBookingRequest, SeatModificationRequest};
use seatline_shared::{BookingDetails, UserIdentity};
use crate::state::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub user: UserIdentity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingDetails>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/lookup", post(get_booking_by_user))
        .route("/v1/bookings/cancel", post(cancel_booking))
        .route("/v1/bookings/seat", post(modify_seat))
        .route("/v1/sections/{section}/bookings", get(list_bookings_by_section))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = state.bookings.create_booking(&req).await?;
    Ok(Json(booking))
}

async fn get_booking_by_user(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = state.bookings.get_booking_by_user(&req.user).await?;
    Ok(Json(booking))
}

async fn list_bookings_by_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<BookingListResponse>, AppError> {
    let bookings = state.bookings.list_bookings_by_section(&section).await?;
    Ok(Json(BookingListResponse { bookings }))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<StatusCode, AppError> {
    state.bookings.cancel_booking(&req.user).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn modify_seat(
    State(state): State<AppState>,
    Json(req): Json<SeatModificationRequest>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = state.bookings.modify_seat(&req).await?;
    Ok(Json(booking))
}
