use std::sync::Arc;
use std::net::SocketAddr;
use anyhow::Context;
use seatline_api::{app, state::AppState};
use seatline_booking::BookingOrchestrator;
use seatline_core::BookingStore;
use seatline_seating::SeatAllocator;
use seatline_store::app_config::{Config, StorageKind};
use seatline_store::{DbClient, InMemoryBookingStore, PgBookingStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatline_api=debug,seatline_booking=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Seatline API on port {}", config.server.port);

    let allocator = Arc::new(
        SeatAllocator::new(config.seating.sections.clone()).context("Invalid seating layout")?,
    );

    let store: Arc<dyn BookingStore> = match config.database.storage {
        StorageKind::Postgres => {
            let db = DbClient::new(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(PgBookingStore::new(db.pool.clone()))
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage; bookings are lost on restart");
            Arc::new(InMemoryBookingStore::new())
        }
    };

    let orchestrator = Arc::new(BookingOrchestrator::new(allocator, store));
    // Occupancy must mirror stored bookings before the first request
    orchestrator
        .reconcile()
        .await
        .context("Failed to reconcile seat occupancy")?;

    let app = app(AppState { bookings: orchestrator });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
