use crate::models::DbBooking;
use chrono::{NaiveDate, NaiveTime, Utc};
use eyre::Result;
use slotwise_core::models::booking::{Booking, BookingStatus};
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_booking<'e, E>(executor: E, booking: &Booking) -> Result<DbBooking>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (id, professional_id, customer_id, booking_date, start_time, end_time, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, professional_id, customer_id, booking_date, start_time, end_time, status, created_at, updated_at
        "#,
    )
    .bind(booking.id)
    .bind(booking.professional_id)
    .bind(booking.customer_id)
    .bind(booking.date)
    .bind(booking.start_time)
    .bind(booking.end_time)
    .bind(booking.status.as_str())
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_booking_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbBooking>>
where
    E: PgExecutor<'e>,
{
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, professional_id, customer_id, booking_date, start_time, end_time, status, created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(booking)
}

pub async fn lock_booking<'e, E>(executor: E, id: Uuid) -> Result<Option<DbBooking>>
where
    E: PgExecutor<'e>,
{
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, professional_id, customer_id, booking_date, start_time, end_time, status, created_at, updated_at
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(booking)
}

/// Pending and confirmed bookings dated within `[from, to]`, in start order.
pub async fn get_active_bookings<'e, E>(
    executor: E,
    professional_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DbBooking>>
where
    E: PgExecutor<'e>,
{
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, professional_id, customer_id, booking_date, start_time, end_time, status, created_at, updated_at
        FROM bookings
        WHERE professional_id = $1
          AND booking_date BETWEEN $2 AND $3
          AND status IN ('pending', 'confirmed')
        ORDER BY booking_date ASC, start_time ASC
        "#,
    )
    .bind(professional_id)
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await?;

    Ok(bookings)
}

pub async fn update_booking_slot<'e, E>(
    executor: E,
    id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<DbBooking>
where
    E: PgExecutor<'e>,
{
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        UPDATE bookings
        SET booking_date = $2, start_time = $3, end_time = $4, updated_at = $5
        WHERE id = $1
        RETURNING id, professional_id, customer_id, booking_date, start_time, end_time, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(date)
    .bind(start_time)
    .bind(end_time)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(booking)
}

pub async fn update_booking_status<'e, E>(executor: E, id: Uuid, status: BookingStatus) -> Result<DbBooking>
where
    E: PgExecutor<'e>,
{
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        UPDATE bookings
        SET status = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, professional_id, customer_id, booking_date, start_time, end_time, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(booking)
}
