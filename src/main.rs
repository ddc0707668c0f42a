use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};
use dotenv::dotenv;
use slotwise_api::config::ApiConfig;
use slotwise_core::clock::SystemClock;
use slotwise_core::sink::TracingEventSink;
use slotwise_core::BookingEngine;
use slotwise_db::{create_pool, schema::initialize_database, PgStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ApiConfig::from_env()?;
    slotwise_api::init_tracing(config.log_level)?;

    let clock = SystemClock::from_offset_minutes(config.clock_offset_minutes)
        .ok_or_else(|| eyre!("CLOCK_UTC_OFFSET_MINUTES is out of range"))?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url, config.db_max_connections).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgStore::new(db_pool));
    let engine = BookingEngine::new(
        store.clone(),
        store,
        Arc::new(TracingEventSink),
        Arc::new(clock),
        config.engine,
    );
    info!(
        horizon_days = config.engine.horizon_days,
        max_range_days = config.engine.max_range_days,
        "Booking engine ready"
    );

    // Start API server
    slotwise_api::start_server(config, engine).await?;

    Ok(())
}
