use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use seatline_core::{BookingStore, StoreError, StoreResult};
use seatline_shared::{Booking, BookingDetails, SeatAssignment, User, UserIdentity};

/// `BookingStore` over the `users` and `tickets` tables
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    from_location: String,
    to_location: String,
    price: i32,
    seat: i32,
    section: String,
    user_id: Uuid,
    booked_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TicketWithUserRow {
    #[sqlx(flatten)]
    ticket: TicketRow,
    first_name: String,
    last_name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

impl TryFrom<TicketRow> for Booking {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let seat = u32::try_from(row.seat)
            .map_err(|_| StoreError::Corrupt(format!("ticket {} has negative seat {}", row.id, row.seat)))?;

        Ok(Booking {
            id: row.id,
            from: row.from_location,
            to: row.to_location,
            price: row.price,
            seat,
            section: row.section,
            user_id: row.user_id,
            booked_at: row.booked_at,
        })
    }
}

impl TryFrom<TicketWithUserRow> for BookingDetails {
    type Error = StoreError;

    fn try_from(row: TicketWithUserRow) -> Result<Self, Self::Error> {
        let user = User {
            id: row.ticket.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        };
        let booking = Booking::try_from(row.ticket)?;
        Ok(BookingDetails::from_parts(booking, &user))
    }
}

fn seat_column(seat: u32) -> StoreResult<i32> {
    i32::try_from(seat).map_err(|_| StoreError::Corrupt(format!("seat {} does not fit the seat column", seat)))
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(db_err.message().to_string());
        }
    }
    StoreError::database(err)
}

const TICKET_COLUMNS: &str = "t.id, t.from_location, t.to_location, t.price, t.seat, t.section, t.user_id, t.booked_at";

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query("INSERT INTO users (id, first_name, last_name, email) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(())
    }

    async fn find_user_by_identity(&self, identity: &UserIdentity) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, email FROM users WHERE first_name = $1 AND last_name = $2 AND email = $3",
        )
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(User::from))
    }

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets (id, from_location, to_location, price, seat, section, user_id, booked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.from)
        .bind(&booking.to)
        .bind(booking.price)
        .bind(seat_column(booking.seat)?)
        .bind(&booking.section)
        .bind(booking.user_id)
        .bind(booking.booked_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn find_booking_by_user_and_route(
        &self,
        user_id: Uuid,
        from: &str,
        to: &str,
    ) -> StoreResult<Option<Booking>> {
        let query = format!(
            "SELECT {} FROM tickets t WHERE t.user_id = $1 AND t.from_location = $2 AND t.to_location = $3",
            TICKET_COLUMNS
        );
        let row = sqlx::query_as::<_, TicketRow>(&query)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(Booking::try_from).transpose()
    }

    async fn find_booking_by_user(&self, user_id: Uuid) -> StoreResult<Option<Booking>> {
        let query = format!("SELECT {} FROM tickets t WHERE t.user_id = $1", TICKET_COLUMNS);
        let row = sqlx::query_as::<_, TicketRow>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings_by_section(&self, section: &str) -> StoreResult<Vec<BookingDetails>> {
        let query = format!(
            r#"
            SELECT {}, u.first_name, u.last_name, u.email
            FROM tickets t
            JOIN users u ON u.id = t.user_id
            WHERE t.section = $1
            ORDER BY t.booked_at
            "#,
            TICKET_COLUMNS
        );
        let rows = sqlx::query_as::<_, TicketWithUserRow>(&query)
            .bind(section)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.into_iter().map(BookingDetails::try_from).collect()
    }

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        let query = format!("SELECT {} FROM tickets t ORDER BY t.booked_at", TICKET_COLUMNS);
        let rows = sqlx::query_as::<_, TicketRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn update_booking_seat(&self, booking_id: Uuid, assignment: &SeatAssignment) -> StoreResult<()> {
        let result = sqlx::query("UPDATE tickets SET seat = $1, section = $2 WHERE id = $3")
            .bind(seat_column(assignment.seat)?)
            .bind(&assignment.section)
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!("ticket {} no longer exists", booking_id)));
        }
        Ok(())
    }

    async fn delete_booking(&self, booking_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(())
    }
}
