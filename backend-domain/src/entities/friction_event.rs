// Friction event entity
// A scored user-frustration signal, immutable once persisted

use clickhouse::Row;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct FrictionEventRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub event_time: OffsetDateTime,
    pub session_id: String,
    pub event_type: String,
    pub element_selector: String,
    pub page_url: String,
    pub user_action: String,
    pub error_message: String,
    /// Always populated by the scorer before persistence; in [0,100].
    pub severity_score: u8,
    pub metadata_json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct PerformanceRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub event_time: OffsetDateTime,
    pub session_id: String,
    pub page_url: String,
    pub metric_name: String,
    pub value_ms: f64,
    pub metadata_json: String,
}
