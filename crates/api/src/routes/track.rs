//! Event ingest endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use event_store::EventStore;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, error, info, warn};
use tracking_core::{
    error::{DbErrorCode, ValidationErrorCode},
    transform_batch, SessionAggregate, TrackPayload,
};

use crate::response::{ApiError, TrackResponse};
use crate::state::AppState;

/// POST /api/track - Batch ingest from the tracker SDK.
///
/// Body is `{ "events": [...] }` in the SDK's camelCase format. Invalid
/// events are skipped and reported in `errors`; the rest are stored and one
/// session aggregate per distinct session ID is upserted.
pub async fn track_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TrackResponse>, ApiError> {
    let start = Instant::now();
    metrics().batches_received.inc();

    let body = body.map_err(|e| {
        warn!(error = %e, "Failed to read ingest body");
        ApiError::from(e)
    })?;

    debug!(payload_size = body.len(), "Received event batch");

    let payload = TrackPayload::parse(&body).map_err(|e| {
        warn!(error = %e, "Rejected ingest payload");
        ApiError::from(e)
    })?;

    let total = payload.events.len();
    metrics().events_received.inc_by(total as u64);

    if total > state.max_batch_events {
        return Err(ApiError::validation(
            ValidationErrorCode::BatchTooLarge.code(),
            vec![format!(
                "Batch has {} events, exceeds {} limit",
                total, state.max_batch_events
            )],
        ));
    }

    let (records, transform_errors) = transform_batch(payload.events);
    let accepted = records.len();
    let rejected = transform_errors.len();

    if rejected > 0 {
        warn!(accepted, rejected, "Some events failed validation");
        metrics().events_rejected.inc_by(rejected as u64);
    }

    if !records.is_empty() {
        let sessions = SessionAggregate::from_records(&records);
        store_batch(state.store.as_ref(), records, sessions).await?;
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().ingest_latency_ms.observe(latency_ms);

    info!(accepted, rejected, latency_ms, "Batch processed");

    let errors = transform_errors.into_iter().map(|e| e.to_string()).collect();
    Ok(Json(TrackResponse::new(accepted, errors)))
}

async fn store_batch(
    store: &dyn EventStore,
    records: Vec<tracking_core::EventRecord>,
    sessions: Vec<SessionAggregate>,
) -> Result<(), ApiError> {
    let stored = store.insert_events(records).await.map_err(|e| {
        error!(error = %e, "Failed to store events");
        store_error("Failed to store events")
    })?;
    metrics().events_stored.inc_by(stored as u64);

    let upserted = store.upsert_sessions(sessions).await.map_err(|e| {
        error!(error = %e, "Failed to upsert sessions");
        store_error("Failed to update sessions")
    })?;
    metrics().sessions_upserted.inc_by(upserted as u64);

    Ok(())
}

/// Store failures surface as `DB_001`; the store's own message stays in
/// the log.
fn store_error(msg: &str) -> ApiError {
    tracking_core::Error::database(DbErrorCode::StoreFailed, msg).into()
}
