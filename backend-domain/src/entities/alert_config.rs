// Alert configuration entity
// Customer-defined notification rules; only last_triggered_at mutates

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub id: String,
    pub user_id: String,
    pub alert_type: String,
    #[serde(default)]
    pub conditions: AlertConditions,
    #[serde(default)]
    pub notification_channels: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AlertConfig {
    /// Condition match for one scored event: severity floor and event-type
    /// allowlist, both optional and AND-ed when present.
    pub fn matches(&self, event_type: &str, severity_score: u8) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(min) = self.conditions.min_severity {
            if severity_score < min {
                return false;
            }
        }
        if let Some(types) = &self.conditions.event_types {
            if !types.iter().any(|candidate| candidate == event_type) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelOutcome {
    pub channel: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_severity: Option<u8>, event_types: Option<Vec<String>>) -> AlertConfig {
        AlertConfig {
            id: "cfg-1".to_string(),
            user_id: "user-1".to_string(),
            alert_type: "friction_spike".to_string(),
            conditions: AlertConditions {
                min_severity,
                event_types,
                ..AlertConditions::default()
            },
            notification_channels: vec!["email".to_string()],
            is_active: true,
            last_triggered_at: None,
        }
    }

    #[test]
    fn min_severity_is_an_inclusive_floor() {
        let cfg = config(Some(8), None);
        assert!(!cfg.matches("error", 7));
        assert!(cfg.matches("error", 8));
    }

    #[test]
    fn event_type_allowlist_filters_when_present() {
        let cfg = config(None, Some(vec!["error".to_string()]));
        assert!(cfg.matches("error", 10));
        assert!(!cfg.matches("hesitation", 10));
    }

    #[test]
    fn inactive_config_never_matches() {
        let mut cfg = config(None, None);
        cfg.is_active = false;
        assert!(!cfg.matches("error", 100));
    }
}
