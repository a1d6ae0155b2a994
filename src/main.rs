//! slotgate server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, the
//! expiration sweeper, and the optional event log writer.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use slotgate::api;
use slotgate::app_state::AppState;
use slotgate::config::ServerConfig;
use slotgate::domain::{BookingStore, CapacityLedger, Catalog, EventBus, TokenVault};
use slotgate::persistence::postgres::{run_event_writer, PostgresEventLog};
use slotgate::service::{BookingService, CheckinService, ExpirationSweeper, HoldPolicy};
use slotgate::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Arc::new(ServerConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?);
    tracing::info!(addr = %config.listen_addr, "starting slotgate");

    // Build domain layer
    let catalog = Arc::new(Catalog::new());
    let ledger = Arc::new(CapacityLedger::new());
    let store = Arc::new(BookingStore::new());
    let vault = Arc::new(TokenVault::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let booking_service = Arc::new(BookingService::new(
        catalog,
        ledger,
        Arc::clone(&store),
        Arc::clone(&vault),
        event_bus.clone(),
        HoldPolicy {
            default_hold_hours: config.default_hold_hours,
            auto_confirm_without_deposit: config.auto_confirm_without_deposit,
        },
    ));
    let checkin_service = Arc::new(CheckinService::new(
        store,
        vault,
        Arc::clone(booking_service.catalog()),
        event_bus.clone(),
        config.qr_grace_hours,
    ));

    // Start the sweeper
    let sweeper = ExpirationSweeper::new(Arc::clone(&booking_service), config.sweep_interval_secs);
    tokio::spawn(sweeper.run());

    // Start the event log writer; a missing database is not fatal
    if config.persistence_enabled {
        match PostgresEventLog::connect(&config).await {
            Ok(log) => {
                if config.cleanup_after_days > 0 {
                    match log.delete_events_before(config.cleanup_after_days).await {
                        Ok(deleted) if deleted > 0 => {
                            tracing::info!(deleted, "cleaned up old event log rows");
                        }
                        Ok(_) => {}
                        Err(err) => tracing::warn!(error = %err, "event log cleanup failed"),
                    }
                }
                tokio::spawn(run_event_writer(log, event_bus.subscribe()));
            }
            Err(err) => {
                tracing::warn!(error = %err, "event log disabled, database unreachable");
            }
        }
    }

    // Build application state
    let app_state = AppState {
        booking_service,
        checkin_service,
        event_bus,
        config: Arc::clone(&config),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("failed to bind listen address")?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
