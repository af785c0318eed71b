use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    domain::availability::{first_conflict, DateRange},
    entities::booking::{Booking, BookingInsert, BookingStatus},
    errors::AppError,
    repositories::sqlx_repo::SqlxBookingRepo,
};

const BOOKING_COLUMNS: &str = "id, property_id, user_id, start_date, end_date, guests, notes, \
    status, created_at, updated_at";

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Pending or confirmed bookings of the property that intersect `range`.
    async fn find_overlapping(&self, property_id: &Uuid, range: &DateRange) -> Result<Vec<Booking>, AppError>;

    /// Checks the range and inserts a pending booking in one transaction.
    /// Fails with `Conflict` if an occupying booking already overlaps.
    async fn create_booking_if_available(&self, booking: &BookingInsert) -> Result<Booking, AppError>;

    async fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, AppError>;
    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Booking>, AppError>;
    /// Bookings made on any property owned by `owner_id`.
    async fn list_for_owner(&self, owner_id: &Uuid) -> Result<Vec<Booking>, AppError>;

    /// Moves a booking from `from` to `to`; `Conflict` if its status changed meanwhile.
    async fn update_status(&self, id: &Uuid, from: BookingStatus, to: BookingStatus) -> Result<Booking, AppError>;

    /// Marks confirmed bookings whose checkout day is on or before `today` as completed.
    async fn complete_elapsed_bookings(&self, today: NaiveDate) -> Result<u64, AppError>;
    async fn count_bookings(&self) -> Result<u64, AppError>;
}

impl SqlxBookingRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxBookingRepo { pool }
    }
}

fn overlap_query() -> String {
    format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings \
         WHERE property_id = $1 \
           AND status IN ('pending', 'confirmed') \
           AND start_date < $3 AND $2 < end_date \
         ORDER BY start_date"
    )
}

#[async_trait]
impl BookingRepository for SqlxBookingRepo {
    async fn find_overlapping(&self, property_id: &Uuid, range: &DateRange) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(&overlap_query())
            .bind(property_id)
            .bind(range.start())
            .bind(range.end())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn create_booking_if_available(&self, booking: &BookingInsert) -> Result<Booking, AppError> {
        let requested = DateRange::new(booking.start_date, booking.end_date)?;
        let mut tx = self.pool.begin().await?;

        // Row lock on the property: concurrent requests for it queue here
        sqlx::query("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
            .bind(booking.property_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        let existing = sqlx::query_as::<_, Booking>(&overlap_query())
            .bind(booking.property_id)
            .bind(requested.start())
            .bind(requested.end())
            .fetch_all(&mut *tx)
            .await?;

        if let Some(conflict) = first_conflict(&booking.property_id, &requested, &existing) {
            tracing::info!(
                property_id = %booking.property_id,
                conflicting_booking = %conflict.id,
                "booking request overlaps an existing reservation"
            );
            return Err(AppError::Conflict(format!(
                "The property is already booked from {} to {}",
                conflict.start_date, conflict.end_date
            )));
        }

        let created = sqlx::query_as::<_, Booking>(&format!(
            r#"INSERT INTO bookings (property_id, user_id, start_date, end_date, guests, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING {BOOKING_COLUMNS}"#
        ))
        .bind(booking.property_id)
        .bind(booking.user_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.guests)
        .bind(&booking.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn list_for_owner(&self, owner_id: &Uuid) -> Result<Vec<Booking>, AppError> {
        let columns = BOOKING_COLUMNS
            .split(", ")
            .map(|c| format!("b.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");

        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {columns} FROM bookings b \
             JOIN properties p ON p.id = b.property_id \
             WHERE p.owner_id = $1 \
             ORDER BY b.start_date ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn update_status(&self, id: &Uuid, from: BookingStatus, to: BookingStatus) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict("Booking status changed, reload and retry".to_string()))
    }

    async fn complete_elapsed_bookings(&self, today: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'completed', updated_at = NOW() \
             WHERE status = 'confirmed' AND end_date <= $1",
        )
        .bind(today)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_bookings(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
