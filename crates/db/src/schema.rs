use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // One row per professional, overwritten on every update
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS professional_availability (
            professional_id UUID PRIMARY KEY,
            weekly_schedule JSONB NOT NULL DEFAULT '[]'::jsonb,
            vacation_start DATE NULL,
            vacation_end DATE NULL,
            blocked_dates DATE[] NOT NULL DEFAULT '{}',
            buffer_minutes INTEGER NOT NULL DEFAULT 0,
            slot_interval_minutes INTEGER NOT NULL DEFAULT 30,
            service_duration_minutes INTEGER NULL,
            auto_decline BOOLEAN NOT NULL DEFAULT FALSE,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_vacation CHECK (
                (vacation_start IS NULL) = (vacation_end IS NULL)
                AND (vacation_start IS NULL OR vacation_start <= vacation_end)
            ),
            CONSTRAINT positive_interval CHECK (slot_interval_minutes > 0),
            CONSTRAINT non_negative_buffer CHECK (buffer_minutes >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            professional_id UUID NOT NULL REFERENCES professional_availability(professional_id),
            customer_id UUID NOT NULL,
            booking_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_booking_range CHECK (end_time > start_time),
            CONSTRAINT valid_booking_status CHECK (
                status IN ('pending', 'confirmed', 'completed', 'cancelled')
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Postgres only runs one statement per prepared query
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_bookings_professional_date ON bookings(professional_id, booking_date)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_customer_id ON bookings(customer_id)",
        // Last line of defence against two active bookings on the same start
        r#"CREATE UNIQUE INDEX IF NOT EXISTS uniq_active_booking_slot
            ON bookings(professional_id, booking_date, start_time)
            WHERE status IN ('pending', 'confirmed')"#,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
