use tracing::{debug, warn};

use backend_domain::services::{scorer, spike};
use backend_domain::utils::{current_millis, date_bucket, millis_to_utc};
use backend_domain::value_objects::clamp_severity;
use backend_domain::{
    ApiKeyRecord,
    FrictionEventRow,
    FrictionPayload,
    HeatmapDelta,
    HeatmapKey,
    HeatmapPayload,
    PerformancePayload,
    PerformanceRow,
    RateLimitConfig,
    RawTrackingEvent,
    SpikeNotice,
    TrackingEvent,
};

use crate::dtos::{Breakdown, IngestSummary};
use crate::ingest::{check_rate_limit, window_identifier, INGEST_ENDPOINT};
use crate::{AppError, AppState};

/// Admission control for one ingestion request: authenticate the key and
/// consume one request from its rate-limit window. Runs before the body is
/// even parsed, so a rejected caller cannot burn server work (or dodge the
/// window) with malformed payloads.
pub async fn authorize_request(
    state: &AppState,
    api_key: Option<String>,
) -> Result<ApiKeyRecord, AppError> {
    let api_key = match api_key {
        Some(key) if !key.trim().is_empty() => key,
        _ => return Err(AppError::MissingApiKey),
    };

    let record = state
        .api_keys
        .find(&api_key)
        .await
        .map_err(AppError::Internal)?;
    let record = match record {
        Some(record) if record.is_active => record,
        _ => return Err(AppError::InvalidApiKey),
    };

    let now = current_millis();
    let limit_config = RateLimitConfig {
        max_requests: record.rate_limit_per_minute,
        window_ms: (state.config.rate_limit_window_seconds * 1000) as i64,
    };
    let identifier = window_identifier(&api_key, now);
    let decision = check_rate_limit(
        state.rate_limits.as_ref(),
        &identifier,
        INGEST_ENDPOINT,
        limit_config,
    )
    .await;
    if !decision.allowed {
        state.metrics.record_rate_limited();
        return Err(AppError::RateLimited {
            remaining: decision.remaining,
            reset_at: decision.reset_at,
        });
    }

    // Best-effort; the response never waits on this write.
    {
        let api_keys = state.api_keys.clone();
        let key = api_key.clone();
        tokio::spawn(async move {
            if let Err(err) = api_keys.touch_last_used(&key, now).await {
                warn!("failed to update last_used_at for api key: {}", err);
            }
        });
    }

    Ok(record)
}

/// Convenience composition of [`authorize_request`] and [`process_events`]
/// for callers that already hold a parsed batch.
pub async fn process_batch(
    state: &AppState,
    api_key: Option<String>,
    events: Vec<RawTrackingEvent>,
) -> Result<IngestSummary, AppError> {
    let record = authorize_request(state, api_key).await?;
    process_events(state, &record, events).await
}

/// Per-event dispatch with failure isolation, then spike detection over the
/// friction events that made it through. The caller has already been
/// admitted by [`authorize_request`].
pub async fn process_events(
    state: &AppState,
    record: &ApiKeyRecord,
    events: Vec<RawTrackingEvent>,
) -> Result<IngestSummary, AppError> {
    let now = current_millis();
    let mut breakdown = Breakdown::default();
    let mut scored_friction: Vec<FrictionEventRow> = Vec::new();

    for raw in &events {
        let event = match raw.classify() {
            Ok(event) => event,
            Err(err) => {
                warn!("dropping malformed {} event: {}", raw.event_type, err);
                state.metrics.record_event_failure();
                continue;
            }
        };

        // One bad event never fails the batch; it is logged, excluded from
        // the success count, and the loop moves on.
        match event {
            TrackingEvent::Friction(payload) => {
                match persist_friction(state, raw, payload, now).await {
                    Ok(row) => {
                        scored_friction.push(row);
                        breakdown.friction += 1;
                    }
                    Err(err) => {
                        warn!("failed to persist friction event: {}", err);
                        state.metrics.record_event_failure();
                    }
                }
            }
            TrackingEvent::Heatmap(payload) => {
                match upsert_heatmap(state, payload, now).await {
                    Ok(()) => breakdown.heatmap += 1,
                    Err(err) => {
                        warn!("failed to upsert heatmap aggregate: {}", err);
                        state.metrics.record_event_failure();
                    }
                }
            }
            TrackingEvent::Performance(payload) => {
                match persist_performance(state, raw, payload, now).await {
                    Ok(()) => breakdown.performance += 1,
                    Err(err) => {
                        warn!("failed to persist performance metric: {}", err);
                        state.metrics.record_event_failure();
                    }
                }
            }
            TrackingEvent::Pageview | TrackingEvent::Other(_) => {
                // Forward compatibility: unhandled types are skipped, not
                // counted, and not an error.
                state.metrics.record_skipped();
            }
        }
    }

    let report = spike::scan(&scored_friction);
    if report.spike_detected {
        debug!(
            "friction spike detected: {} high-severity events",
            report.high_severity_count
        );
        state.metrics.record_spike();
        notify_spike(state, &record.user_id, &scored_friction, &report).await;
    }

    let processed = breakdown.friction + breakdown.heatmap + breakdown.performance;
    state.metrics.record_ingest(processed);
    Ok(IngestSummary {
        processed,
        breakdown,
        high_severity_count: report.high_severity_count,
        spike_detected: report.spike_detected,
    })
}

async fn persist_friction(
    state: &AppState,
    raw: &RawTrackingEvent,
    payload: FrictionPayload,
    now: i64,
) -> anyhow::Result<FrictionEventRow> {
    // Client-supplied scores are a hint at most; anything beyond clamping
    // comes from the scorer.
    let severity_score = match payload.severity_score {
        Some(hint) => clamp_severity(hint),
        None => scorer::score(&payload),
    };
    let row = FrictionEventRow {
        event_time: millis_to_utc(raw.timestamp.unwrap_or(now)),
        session_id: raw.session_id.clone(),
        event_type: payload.event_type,
        element_selector: payload.element_selector.unwrap_or_default(),
        page_url: payload.page_url,
        user_action: payload.user_action.unwrap_or_default(),
        error_message: payload.error_message.unwrap_or_default(),
        severity_score,
        metadata_json: serde_json::to_string(&payload.metadata)?,
    };
    state
        .event_store
        .insert_friction_events(std::slice::from_ref(&row))
        .await?;
    Ok(row)
}

async fn upsert_heatmap(
    state: &AppState,
    payload: HeatmapPayload,
    now: i64,
) -> anyhow::Result<()> {
    if payload.page_url.trim().is_empty() {
        anyhow::bail!("heatmap event missing pageUrl");
    }
    let key = HeatmapKey {
        page_url: payload.page_url,
        element_selector: payload.element_selector,
        interaction_type: payload.interaction_type,
        date_bucket: date_bucket(now),
    };
    let delta = HeatmapDelta::single(
        &key,
        clamp_severity(payload.friction_score.unwrap_or(0)),
        payload.duration_ms.unwrap_or(0),
    );
    state.event_store.upsert_heatmap(&delta).await
}

async fn persist_performance(
    state: &AppState,
    raw: &RawTrackingEvent,
    payload: PerformancePayload,
    now: i64,
) -> anyhow::Result<()> {
    let row = PerformanceRow {
        event_time: millis_to_utc(raw.timestamp.unwrap_or(now)),
        session_id: raw.session_id.clone(),
        page_url: payload.page_url,
        metric_name: payload.metric_name,
        value_ms: payload.value_ms,
        metadata_json: serde_json::to_string(&payload.metadata)?,
    };
    state
        .event_store
        .insert_performance_rows(std::slice::from_ref(&row))
        .await
}

/// Touches every active friction-spike config (fire-and-forget per config),
/// hands the batch's worst event to the dispatcher, and broadcasts a notice
/// to live stream clients.
async fn notify_spike(
    state: &AppState,
    user_id: &str,
    scored: &[FrictionEventRow],
    report: &spike::SpikeReport,
) {
    let configs = match state.alert_configs.list_active("friction_spike").await {
        Ok(configs) => configs,
        Err(err) => {
            warn!("failed to load alert configs for spike: {}", err);
            return;
        }
    };

    let now = current_millis();
    for config in &configs {
        if let Err(err) = state.alert_configs.touch_triggered(&config.id, now).await {
            warn!(
                "failed to update last_triggered_at for alert config {}: {}",
                config.id, err
            );
        }
    }

    let Some(top) = scored.iter().max_by_key(|event| event.severity_score) else {
        return;
    };

    state
        .spike_stream
        .broadcast_all(&SpikeNotice {
            timestamp_ms: now,
            user_id: user_id.to_string(),
            high_severity_count: report.high_severity_count,
            page_url: top.page_url.clone(),
            top_severity: top.severity_score,
        })
        .await;

    if !configs.is_empty() {
        state.dispatcher.spawn_dispatch(top.clone(), configs);
    }
}
