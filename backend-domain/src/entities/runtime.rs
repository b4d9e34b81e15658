// Runtime configuration and operational records shared across layers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub ops_token: Option<String>,
    pub api_keys_path: String,
    pub alert_configs_path: String,
    pub rate_limit_window_seconds: u64,
    pub notification_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}

/// One dispatcher run, kept for the ops surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDeliveryRecord {
    pub timestamp_ms: i64,
    pub config_id: String,
    pub event_type: String,
    pub severity_score: u8,
    pub outcomes: Vec<crate::entities::ChannelOutcome>,
}

/// Broadcast payload for live dashboard clients when a batch trips the
/// spike threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeNotice {
    pub timestamp_ms: i64,
    pub user_id: String,
    pub high_severity_count: usize,
    pub page_url: String,
    pub top_severity: u8,
}
