use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

/// The identity a caller presents: the lookup key for a user record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserIdentity {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// All three fields carry a non-blank value
    pub fn is_present(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// A persisted user, created on the first booking for an identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn new(identity: &UserIdentity) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email: identity.email.clone(),
        }
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// A seat number inside a named section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SeatAssignment {
    pub seat: u32,
    pub section: String,
}

impl SeatAssignment {
    pub fn new(seat: u32, section: impl Into<String>) -> Self {
        Self {
            seat,
            section: section.into(),
        }
    }
}

impl fmt::Display for SeatAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.seat)
    }
}

/// A ticket: one seat on one route for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub price: i32,
    pub seat: u32,
    pub section: String,
    pub user_id: Uuid,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(user_id: Uuid, from: &str, to: &str, price: i32, assignment: SeatAssignment) -> Self {
        Self {
            id: Uuid::new_v4(),
            from: from.to_string(),
            to: to.to_string(),
            price,
            seat: assignment.seat,
            section: assignment.section,
            user_id,
            booked_at: Utc::now(),
        }
    }

    pub fn assignment(&self) -> SeatAssignment {
        SeatAssignment::new(self.seat, self.section.clone())
    }

    pub fn is_route(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }
}

/// A booking joined with its owner's identity; the shape every read returns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingDetails {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub price: i32,
    pub seat: u32,
    pub section: String,
    pub user: UserIdentity,
    pub booked_at: DateTime<Utc>,
}

impl BookingDetails {
    pub fn from_parts(booking: Booking, user: &User) -> Self {
        Self {
            id: booking.id,
            from: booking.from,
            to: booking.to,
            price: booking.price,
            seat: booking.seat,
            section: booking.section,
            user: user.identity(),
            booked_at: booking.booked_at,
        }
    }

    pub fn assignment(&self) -> SeatAssignment {
        SeatAssignment::new(self.seat, self.section.clone())
    }
}
