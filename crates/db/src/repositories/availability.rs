use crate::models::DbAvailability;
use chrono::Utc;
use eyre::Result;
use slotwise_core::models::schedule::ProfessionalAvailability;
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

const COLUMNS: &str = "professional_id, weekly_schedule, vacation_start, vacation_end, blocked_dates, \
     buffer_minutes, slot_interval_minutes, service_duration_minutes, auto_decline, updated_at";

pub async fn get_availability<'e, E>(executor: E, professional_id: Uuid) -> Result<Option<DbAvailability>>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "SELECT {} FROM professional_availability WHERE professional_id = $1",
        COLUMNS
    );
    let availability = sqlx::query_as::<_, DbAvailability>(&query)
        .bind(professional_id)
        .fetch_optional(executor)
        .await?;

    Ok(availability)
}

/// Reads the row and holds a write lock on it until the transaction ends.
///
/// Every commit for a professional takes this lock first, which serializes
/// them.
pub async fn lock_availability<'e, E>(executor: E, professional_id: Uuid) -> Result<Option<DbAvailability>>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "SELECT {} FROM professional_availability WHERE professional_id = $1 FOR UPDATE",
        COLUMNS
    );
    let availability = sqlx::query_as::<_, DbAvailability>(&query)
        .bind(professional_id)
        .fetch_optional(executor)
        .await?;

    Ok(availability)
}

pub async fn upsert_availability<'e, E>(
    executor: E,
    availability: &ProfessionalAvailability,
) -> Result<DbAvailability>
where
    E: PgExecutor<'e>,
{
    let now = Utc::now();
    let blocked_dates: Vec<_> = availability.blocked_dates.iter().copied().collect();

    tracing::debug!(
        professional_id = %availability.professional_id,
        days = availability.weekly_schedule.days().len(),
        blocked = blocked_dates.len(),
        "Writing availability"
    );

    let query = format!(
        r#"
        INSERT INTO professional_availability ({columns})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (professional_id) DO UPDATE SET
            weekly_schedule = EXCLUDED.weekly_schedule,
            vacation_start = EXCLUDED.vacation_start,
            vacation_end = EXCLUDED.vacation_end,
            blocked_dates = EXCLUDED.blocked_dates,
            buffer_minutes = EXCLUDED.buffer_minutes,
            slot_interval_minutes = EXCLUDED.slot_interval_minutes,
            service_duration_minutes = EXCLUDED.service_duration_minutes,
            auto_decline = EXCLUDED.auto_decline,
            updated_at = EXCLUDED.updated_at
        RETURNING {columns}
        "#,
        columns = COLUMNS
    );

    let row = sqlx::query_as::<_, DbAvailability>(&query)
        .bind(availability.professional_id)
        .bind(Json(&availability.weekly_schedule))
        .bind(availability.vacation.map(|vacation| vacation.start_date))
        .bind(availability.vacation.map(|vacation| vacation.end_date))
        .bind(blocked_dates)
        .bind(i32::try_from(availability.buffer_minutes)?)
        .bind(i32::try_from(availability.slot_interval_minutes)?)
        .bind(
            availability
                .service_duration_minutes
                .map(i32::try_from)
                .transpose()?,
        )
        .bind(availability.auto_decline)
        .bind(now)
        .fetch_one(executor)
        .await?;

    Ok(row)
}
