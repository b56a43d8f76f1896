use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use seatline_core::{BookingStore, StoreError};
use seatline_seating::{AllocationError, SeatAllocator, SectionOccupancy};
use seatline_shared::{Booking, BookingDetails, Masked, SeatAssignment, User, UserIdentity};
use crate::models::{CreateBookingRequest, ReconcileReport, SeatModificationRequest};

/// Booking lifecycle on top of the seat allocator and the durable store.
///
/// Mutations (create, cancel, modify, reconcile) hold the write half of
/// `gate` for their whole store + allocator sequence; reads hold the read
/// half, so they run in parallel and never see a half-applied mutation.
pub struct BookingOrchestrator {
    allocator: Arc<SeatAllocator>,
    store: Arc<dyn BookingStore>,
    gate: RwLock<()>,
}

impl BookingOrchestrator {
    pub fn new(allocator: Arc<SeatAllocator>, store: Arc<dyn BookingStore>) -> Self {
        Self {
            allocator,
            store,
            gate: RwLock::new(()),
        }
    }

    /// Book a seat for a user on a route.
    ///
    /// A repeated request for the same user and route returns the existing
    /// booking without touching occupancy.
    pub async fn create_booking(&self, req: &CreateBookingRequest) -> BookingResult<BookingDetails> {
        if req.from.trim().is_empty() || req.to.trim().is_empty() || req.price == 0 || !req.user.is_present() {
            return Err(BookingError::InvalidArgument("Invalid create booking request".to_string()));
        }

        let _guard = self.gate.write().await;

        let existing_user = self.store.find_user_by_identity(&req.user).await?;
        if let Some(user) = &existing_user {
            if let Some(booking) = self.store.find_booking_by_user_and_route(user.id, &req.from, &req.to).await? {
                info!(
                    "Ticket already exists from {} to {} for user {} with seat {}",
                    booking.from,
                    booking.to,
                    user.id,
                    booking.assignment()
                );
                return Ok(BookingDetails::from_parts(booking, user));
            }

            if let Some(other) = self.store.find_booking_by_user(user.id).await? {
                return Err(BookingError::InvalidArgument(format!(
                    "User already holds a booking from {} to {}",
                    other.from, other.to
                )));
            }
        }

        let assignment = self.allocator.allocate().map_err(|err| {
            error!("Seat allocation failed: {}", err);
            BookingError::Internal(format!("Error while allocating seat: {}", err))
        })?;

        let user = match existing_user {
            Some(user) => user,
            None => {
                let user = User::new(&req.user);
                if let Err(err) = self.store.insert_user(&user).await {
                    self.allocator.deallocate(assignment.seat, &assignment.section);
                    return Err(err.into());
                }
                info!("Added new user with email {}", Masked(&user.email));
                user
            }
        };

        let booking = Booking::new(user.id, &req.from, &req.to, req.price, assignment);
        if let Err(err) = self.store.insert_booking(&booking).await {
            self.allocator.deallocate(booking.seat, &booking.section);
            return Err(err.into());
        }

        info!(
            "Booked new ticket from {} to {} for user {} with seat {}",
            booking.from,
            booking.to,
            Masked(&user.email),
            booking.assignment()
        );
        Ok(BookingDetails::from_parts(booking, &user))
    }

    pub async fn get_booking_by_user(&self, identity: &UserIdentity) -> BookingResult<BookingDetails> {
        Self::require_identity(identity)?;
        let _guard = self.gate.read().await;

        let (user, booking) = self.current_booking(identity).await?;
        Ok(BookingDetails::from_parts(booking, &user))
    }

    /// Every booking seated in a section; an unknown section yields an empty list
    pub async fn list_bookings_by_section(&self, section: &str) -> BookingResult<Vec<BookingDetails>> {
        if section.trim().is_empty() {
            return Err(BookingError::InvalidArgument("Section is required".to_string()));
        }

        let _guard = self.gate.read().await;
        Ok(self.store.list_bookings_by_section(section).await?)
    }

    /// Delete the user's booking and release its seat.
    ///
    /// The record goes first: a failed delete leaves both the record and the
    /// seat in place.
    pub async fn cancel_booking(&self, identity: &UserIdentity) -> BookingResult<()> {
        Self::require_identity(identity)?;
        let _guard = self.gate.write().await;

        let (_, booking) = self.current_booking(identity).await?;
        self.store.delete_booking(booking.id).await?;
        self.allocator.deallocate(booking.seat, &booking.section);

        info!(
            "Cancelled booking {} for user {}, released seat {}",
            booking.id,
            Masked(&identity.email),
            booking.assignment()
        );
        Ok(())
    }

    /// Move the user's booking to a specific seat, releasing the old one
    pub async fn modify_seat(&self, req: &SeatModificationRequest) -> BookingResult<BookingDetails> {
        Self::require_identity(&req.user)?;
        if req.section.trim().is_empty() {
            return Err(BookingError::InvalidArgument("Section is required".to_string()));
        }

        info!("Received booking modification request for user {}", Masked(&req.user.email));
        let _guard = self.gate.write().await;

        let (user, mut booking) = self.current_booking(&req.user).await?;
        let current = booking.assignment();
        let target = SeatAssignment::new(req.seat, req.section.clone());

        if current == target {
            return Err(BookingError::InvalidArgument("Old and new seats can't be same".to_string()));
        }

        self.allocator.reassign(&current, &target).map_err(|err| match err {
            AllocationError::SeatUnavailable { seat, section } => BookingError::InvalidArgument(format!(
                "Seat number {} in section {} is not available",
                seat, section
            )),
            other => BookingError::Internal(other.to_string()),
        })?;

        if let Err(err) = self.store.update_booking_seat(booking.id, &target).await {
            if let Err(rollback) = self.allocator.reassign(&target, &current) {
                error!("Could not restore seat {} for booking {}: {}", current, booking.id, rollback);
            }
            return Err(err.into());
        }

        booking.seat = target.seat;
        booking.section = target.section;
        info!("Moved booking {} from seat {} to {}", booking.id, current, booking.assignment());
        Ok(BookingDetails::from_parts(booking, &user))
    }

    /// Rebuild occupancy from the bookings already in the store.
    ///
    /// Run once, against a fresh allocator, before serving requests. Records
    /// whose seat cannot be restored are logged and counted, not fatal.
    pub async fn reconcile(&self) -> BookingResult<ReconcileReport> {
        let _guard = self.gate.write().await;
        let mut report = ReconcileReport::default();

        for booking in self.store.list_bookings().await? {
            match self.allocator.restore(&booking.assignment()) {
                Ok(()) => report.restored += 1,
                Err(err) => {
                    warn!("Skipping booking {} during reconciliation: {}", booking.id, err);
                    report.skipped += 1;
                }
            }
        }

        info!(
            "Occupancy reconciled: {} seats restored, {} bookings skipped",
            report.restored, report.skipped
        );
        Ok(report)
    }

    pub fn occupancy(&self) -> Vec<SectionOccupancy> {
        self.allocator.occupancy()
    }

    async fn current_booking(&self, identity: &UserIdentity) -> BookingResult<(User, Booking)> {
        let not_found = || BookingError::NotFound(format!("No booking exists with email {}", identity.email));

        let user = self
            .store
            .find_user_by_identity(identity)
            .await?
            .ok_or_else(not_found)?;
        let booking = self
            .store
            .find_booking_by_user(user.id)
            .await?
            .ok_or_else(not_found)?;

        Ok((user, booking))
    }

    fn require_identity(identity: &UserIdentity) -> BookingResult<()> {
        if identity.is_present() {
            Ok(())
        } else {
            Err(BookingError::InvalidArgument("User first name, last name and email are required".to_string()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        error!("Booking store failure: {}", err);
        BookingError::Internal(err.to_string())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
