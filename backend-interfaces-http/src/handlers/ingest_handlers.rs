use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tracing::error;

use backend_application::commands::ingest_commands;
use backend_application::{AppState, Breakdown};

use crate::error::HttpError;
use crate::middleware::{extract_api_key, parse_batch};

#[derive(Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub processed: usize,
    pub breakdown: Breakdown,
    pub high_severity_count: usize,
    pub spike_detected: bool,
}

pub async fn ingest_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<IngestResponse>, HttpError> {
    // Key validation and the rate limit come before body parsing; a caller
    // the gateway would reject never gets a 400, and malformed payloads
    // still consume from the window.
    let api_key = extract_api_key(&headers);
    let record = ingest_commands::authorize_request(&state, api_key).await?;

    let events = parse_batch(&headers, &body).map_err(|err| {
        error!("failed to parse ingest body: {}", err);
        HttpError::InvalidEvents
    })?;

    let summary = ingest_commands::process_events(&state, &record, events).await?;
    Ok(Json(IngestResponse {
        success: true,
        processed: summary.processed,
        breakdown: summary.breakdown,
        high_severity_count: summary.high_severity_count,
        spike_detected: summary.spike_detected,
    }))
}
