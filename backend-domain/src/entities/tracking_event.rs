// Tracking event entity
// Untrusted wire shape sent by the browser SDK, classified into a closed
// sum type before any processing

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrackingEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestEnvelope {
    #[serde(default)]
    pub events: Vec<RawTrackingEvent>,
}

/// Typed view of one tracking event. `Pageview` and `Other` carry no payload
/// because the ingestion pipeline skips them; keeping them as variants makes
/// adding a handler a compile-time-visible change rather than a silent no-op.
#[derive(Debug, Clone)]
pub enum TrackingEvent {
    Friction(FrictionPayload),
    Heatmap(HeatmapPayload),
    Performance(PerformancePayload),
    Pageview,
    Other(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrictionPayload {
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub element_selector: Option<String>,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub user_action: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Client-supplied hint; never trusted beyond clamping.
    #[serde(default)]
    pub severity_score: Option<u32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPayload {
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub element_selector: String,
    #[serde(default)]
    pub interaction_type: String,
    #[serde(default)]
    pub friction_score: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePayload {
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub metric_name: String,
    #[serde(default)]
    pub value_ms: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl RawTrackingEvent {
    /// Classifies by the `type` tag and decodes the payload map. A recognized
    /// type with a malformed payload is an error so the gateway can drop just
    /// that event; unrecognized types classify as `Other` and are never an
    /// error.
    pub fn classify(&self) -> Result<TrackingEvent, serde_json::Error> {
        match self.event_type.as_str() {
            "friction" => serde_json::from_value(self.data.clone()).map(TrackingEvent::Friction),
            "heatmap" => serde_json::from_value(self.data.clone()).map(TrackingEvent::Heatmap),
            "performance" => {
                serde_json::from_value(self.data.clone()).map(TrackingEvent::Performance)
            }
            "pageview" => Ok(TrackingEvent::Pageview),
            other => Ok(TrackingEvent::Other(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_recognizes_friction_payload() {
        let raw = RawTrackingEvent {
            event_type: "friction".to_string(),
            session_id: "s1".to_string(),
            timestamp: Some(1_700_000_000_000),
            data: json!({"eventType": "error", "pageUrl": "/checkout"}),
        };
        match raw.classify().expect("classify friction") {
            TrackingEvent::Friction(payload) => {
                assert_eq!(payload.event_type, "error");
                assert_eq!(payload.page_url, "/checkout");
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn classify_routes_unrecognized_type_to_other() {
        let raw = RawTrackingEvent {
            event_type: "bogus".to_string(),
            session_id: "s1".to_string(),
            timestamp: None,
            data: json!({}),
        };
        match raw.classify().expect("classify unknown") {
            TrackingEvent::Other(kind) => assert_eq!(kind, "bogus"),
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn classify_rejects_malformed_payload_for_known_type() {
        let raw = RawTrackingEvent {
            event_type: "heatmap".to_string(),
            session_id: "s1".to_string(),
            timestamp: None,
            data: json!("not a map"),
        };
        assert!(raw.classify().is_err());
    }
}
