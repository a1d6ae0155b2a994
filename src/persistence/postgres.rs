//! PostgreSQL implementation of the booking event log.

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::domain::BookingEvent;
use crate::error::BookingError;

/// PostgreSQL-backed event log using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresEventLog {
    pool: PgPool,
}

impl PostgresEventLog {
    /// Creates a new event log with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database configured in `ServerConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] if the connection fails.
    pub async fn connect(config: &ServerConfig) -> Result<Self, BookingError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await
            .map_err(|e| BookingError::Persistence(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Appends an event to the log.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] on database failure.
    pub async fn save_event(
        &self,
        ticket_id: Uuid,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, BookingError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO booking_events (ticket_id, event_type, payload) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(ticket_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BookingError::Persistence(e.to_string()))?;

        Ok(row)
    }

    /// Deletes log entries older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] on database failure.
    pub async fn delete_events_before(&self, before_days: u64) -> Result<u64, BookingError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM booking_events WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| BookingError::Persistence(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

/// Consumes the broadcast bus and writes every event to the log.
///
/// Runs until the bus closes. Write failures are logged and skipped so a
/// database hiccup never stalls the engine.
pub async fn run_event_writer(log: PostgresEventLog, mut rx: broadcast::Receiver<BookingEvent>) {
    tracing::info!("event log writer started");
    loop {
        match rx.recv().await {
            Ok(event) => {
                let ticket_id = *event.ticket_id().as_uuid();
                let event_type = event.event_type_str();
                let payload = serde_json::to_value(&event).unwrap_or_default();
                if let Err(err) = log.save_event(ticket_id, event_type, &payload).await {
                    tracing::warn!(%ticket_id, event_type, error = %err, "event log write failed");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "event log writer lagged behind event bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::info!("event log writer stopped");
}
