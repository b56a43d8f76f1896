use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use seatline_core::{BookingStore, StoreError, StoreResult};
use seatline_shared::{Booking, BookingDetails, SeatAssignment, User, UserIdentity};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tickets: HashMap<Uuid, Booking>,
}

impl Tables {
    fn seat_taken_by_other(&self, booking_id: Uuid, assignment: &SeatAssignment) -> bool {
        self.tickets
            .values()
            .any(|t| t.id != booking_id && t.seat == assignment.seat && t.section == assignment.section)
    }
}

/// Process-local `BookingStore` with the same unique keys as the SQL schema
#[derive(Default)]
pub struct InMemoryBookingStore {
    tables: RwLock<Tables>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let identity = user.identity();

        if tables.users.contains_key(&user.id) || tables.users.values().any(|u| u.identity() == identity) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }

        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_identity(&self, identity: &UserIdentity) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.identity() == *identity).cloned())
    }

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&booking.user_id) {
            return Err(StoreError::Conflict(format!("user {} does not exist", booking.user_id)));
        }
        if tables.tickets.contains_key(&booking.id) {
            return Err(StoreError::Conflict(format!("ticket {} already exists", booking.id)));
        }
        if tables.tickets.values().any(|t| t.user_id == booking.user_id) {
            return Err(StoreError::Conflict(format!("user {} already holds a ticket", booking.user_id)));
        }
        if tables.seat_taken_by_other(booking.id, &booking.assignment()) {
            return Err(StoreError::Conflict(format!("seat {} is already ticketed", booking.assignment())));
        }

        tables.tickets.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_booking_by_user_and_route(
        &self,
        user_id: Uuid,
        from: &str,
        to: &str,
    ) -> StoreResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .values()
            .find(|t| t.user_id == user_id && t.is_route(from, to))
            .cloned())
    }

    async fn find_booking_by_user(&self, user_id: Uuid) -> StoreResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables.tickets.values().find(|t| t.user_id == user_id).cloned())
    }

    async fn list_bookings_by_section(&self, section: &str) -> StoreResult<Vec<BookingDetails>> {
        let tables = self.tables.read().await;

        let mut tickets: Vec<&Booking> = tables.tickets.values().filter(|t| t.section == section).collect();
        tickets.sort_by_key(|t| t.booked_at);

        tickets
            .into_iter()
            .map(|ticket| -> StoreResult<BookingDetails> {
                let user = tables
                    .users
                    .get(&ticket.user_id)
                    .ok_or_else(|| StoreError::Corrupt(format!("ticket {} has no owner", ticket.id)))?;
                Ok(BookingDetails::from_parts(ticket.clone(), user))
            })
            .collect()
    }

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;

        let mut tickets: Vec<Booking> = tables.tickets.values().cloned().collect();
        tickets.sort_by_key(|t| t.booked_at);
        Ok(tickets)
    }

    async fn update_booking_seat(&self, booking_id: Uuid, assignment: &SeatAssignment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        if tables.seat_taken_by_other(booking_id, assignment) {
            return Err(StoreError::Conflict(format!("seat {} is already ticketed", assignment)));
        }

        let ticket = tables
            .tickets
            .get_mut(&booking_id)
            .ok_or_else(|| StoreError::Conflict(format!("ticket {} no longer exists", booking_id)))?;
        ticket.seat = assignment.seat;
        ticket.section = assignment.section.clone();
        Ok(())
    }

    async fn delete_booking(&self, booking_id: Uuid) -> StoreResult<()> {
        self.tables.write().await.tickets.remove(&booking_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(store: &InMemoryBookingStore, identity: UserIdentity, seat: u32, section: &str) -> (User, Booking) {
        let user = User::new(&identity);
        store.insert_user(&user).await.unwrap();
        let booking = Booking::new(user.id, "London", "France", 20, SeatAssignment::new(seat, section));
        store.insert_booking(&booking).await.unwrap();
        (user, booking)
    }

    #[tokio::test]
    async fn test_user_lookup_uses_full_identity() {
        let store = InMemoryBookingStore::new();
        let ann = UserIdentity::new("Ann", "Lee", "ann@x.com");
        let user = User::new(&ann);
        store.insert_user(&user).await.unwrap();

        assert_eq!(store.find_user_by_identity(&ann).await.unwrap(), Some(user));
        let other = UserIdentity::new("Ann", "Smith", "ann@x.com");
        assert_eq!(store.find_user_by_identity(&other).await.unwrap(), None);

        let duplicate = User::new(&ann);
        assert!(matches!(store.insert_user(&duplicate).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_booking_lookups() {
        let store = InMemoryBookingStore::new();
        let (user, booking) = seeded(&store, UserIdentity::new("Ann", "Lee", "ann@x.com"), 3, "A").await;

        assert_eq!(store.find_booking_by_user(user.id).await.unwrap(), Some(booking.clone()));
        assert_eq!(
            store.find_booking_by_user_and_route(user.id, "London", "France").await.unwrap(),
            Some(booking)
        );
        assert_eq!(store.find_booking_by_user_and_route(user.id, "France", "London").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unique_keys_are_enforced() {
        let store = InMemoryBookingStore::new();
        let (user, _) = seeded(&store, UserIdentity::new("Ann", "Lee", "ann@x.com"), 3, "A").await;

        // Second ticket for the same user
        let again = Booking::new(user.id, "Paris", "Rome", 10, SeatAssignment::new(4, "A"));
        assert!(matches!(store.insert_booking(&again).await, Err(StoreError::Conflict(_))));

        // Same seat for another user
        let bob = User::new(&UserIdentity::new("Bob", "Ray", "bob@x.com"));
        store.insert_user(&bob).await.unwrap();
        let clash = Booking::new(bob.id, "London", "France", 20, SeatAssignment::new(3, "A"));
        assert!(matches!(store.insert_booking(&clash).await, Err(StoreError::Conflict(_))));

        // Unknown owner
        let orphan = Booking::new(Uuid::new_v4(), "London", "France", 20, SeatAssignment::new(9, "B"));
        assert!(matches!(store.insert_booking(&orphan).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_joins_owner_and_filters_section() {
        let store = InMemoryBookingStore::new();
        seeded(&store, UserIdentity::new("Ann", "Lee", "ann@x.com"), 3, "A").await;
        seeded(&store, UserIdentity::new("Bob", "Ray", "bob@x.com"), 3, "B").await;
        seeded(&store, UserIdentity::new("Cy", "Oh", "cy@x.com"), 8, "A").await;

        let section_a = store.list_bookings_by_section("A").await.unwrap();
        assert_eq!(section_a.len(), 2);
        assert!(section_a.iter().all(|b| b.section == "A"));
        assert!(section_a.iter().any(|b| b.user.email == "cy@x.com"));

        assert!(store.list_bookings_by_section("C").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_bookings_spans_all_sections() {
        let store = InMemoryBookingStore::new();
        seeded(&store, UserIdentity::new("Ann", "Lee", "ann@x.com"), 3, "A").await;
        seeded(&store, UserIdentity::new("Bob", "Ray", "bob@x.com"), 3, "C").await;

        let all = store.list_bookings().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|b| b.assignment() == SeatAssignment::new(3, "C")));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryBookingStore::new();
        let (user, booking) = seeded(&store, UserIdentity::new("Ann", "Lee", "ann@x.com"), 3, "A").await;
        seeded(&store, UserIdentity::new("Bob", "Ray", "bob@x.com"), 5, "B").await;

        assert!(matches!(
            store.update_booking_seat(booking.id, &SeatAssignment::new(5, "B")).await,
            Err(StoreError::Conflict(_))
        ));

        store.update_booking_seat(booking.id, &SeatAssignment::new(6, "B")).await.unwrap();
        let moved = store.find_booking_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(moved.assignment(), SeatAssignment::new(6, "B"));

        store.delete_booking(booking.id).await.unwrap();
        store.delete_booking(booking.id).await.unwrap();
        assert_eq!(store.find_booking_by_user(user.id).await.unwrap(), None);
        assert!(store.update_booking_seat(booking.id, &SeatAssignment::new(1, "A")).await.is_err());
    }
}
