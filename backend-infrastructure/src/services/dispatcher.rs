use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::warn;

use backend_domain::ports::AlertDispatcher;
use backend_domain::utils::current_millis;
use backend_domain::{
    AlertConfig,
    AlertDeliveryRecord,
    ChannelOutcome,
    FrictionEventRow,
    NotificationChannel,
};

const DELIVERY_HISTORY_LIMIT: usize = 200;

/// A notification the email channel has queued for the (out-of-scope)
/// delivery worker. Recording it locally cannot fail, which is what makes
/// the email channel safe to run alongside the network ones.
#[derive(Debug, Clone, Serialize)]
pub struct PendingEmail {
    pub email: String,
    pub alert_id: String,
    pub event_type: String,
    pub severity_score: u8,
    pub created_at_ms: i64,
}

struct DispatcherInner {
    http: Client,
    deliveries: RwLock<VecDeque<AlertDeliveryRecord>>,
    email_outbox: RwLock<Vec<PendingEmail>>,
}

pub struct DefaultAlertDispatcher {
    inner: Arc<DispatcherInner>,
}

impl DefaultAlertDispatcher {
    pub fn new(timeout_seconds: u64) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            inner: Arc::new(DispatcherInner {
                http,
                deliveries: RwLock::new(VecDeque::new()),
                email_outbox: RwLock::new(Vec::new()),
            }),
        })
    }

    pub async fn pending_emails(&self) -> Vec<PendingEmail> {
        self.inner.email_outbox.read().await.clone()
    }
}

#[async_trait]
impl AlertDispatcher for DefaultAlertDispatcher {
    fn spawn_dispatch(&self, event: FrictionEventRow, configs: Vec<AlertConfig>) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let outcomes = dispatch_all(&inner, &event, &configs).await;
            if outcomes.iter().any(|outcome| !outcome.success) {
                warn!(
                    "alert dispatch finished with failures: {:?}",
                    outcomes
                        .iter()
                        .filter(|outcome| !outcome.success)
                        .map(|outcome| outcome.channel.as_str())
                        .collect::<Vec<_>>()
                );
            }
        });
    }

    async fn dispatch(
        &self,
        event: &FrictionEventRow,
        configs: &[AlertConfig],
    ) -> Vec<ChannelOutcome> {
        dispatch_all(&self.inner, event, configs).await
    }

    async fn list_deliveries(&self, limit: usize) -> Vec<AlertDeliveryRecord> {
        let deliveries = self.inner.deliveries.read().await;
        deliveries.iter().rev().take(limit).cloned().collect()
    }

    async fn last_delivery(&self) -> Option<AlertDeliveryRecord> {
        let deliveries = self.inner.deliveries.read().await;
        deliveries.back().cloned()
    }
}

async fn dispatch_all(
    inner: &DispatcherInner,
    event: &FrictionEventRow,
    configs: &[AlertConfig],
) -> Vec<ChannelOutcome> {
    let mut all_outcomes = Vec::new();
    for config in configs {
        if !config.matches(&event.event_type, event.severity_score) {
            continue;
        }

        let channel_futures: Vec<_> = config
            .notification_channels
            .iter()
            .filter_map(|name| match NotificationChannel::parse(name) {
                Some(channel) => Some(deliver(inner, channel, config, event)),
                None => {
                    warn!(
                        "alert config {} names unknown channel '{}', skipping",
                        config.id, name
                    );
                    None
                }
            })
            .collect();

        // Settle-all: every channel runs to completion and reports its own
        // outcome; one failure never short-circuits the rest.
        let outcomes = join_all(channel_futures).await;

        let record = AlertDeliveryRecord {
            timestamp_ms: current_millis(),
            config_id: config.id.clone(),
            event_type: event.event_type.clone(),
            severity_score: event.severity_score,
            outcomes: outcomes.clone(),
        };
        let mut deliveries = inner.deliveries.write().await;
        if deliveries.len() >= DELIVERY_HISTORY_LIMIT {
            deliveries.pop_front();
        }
        deliveries.push_back(record);

        all_outcomes.extend(outcomes);
    }
    all_outcomes
}

async fn deliver(
    inner: &DispatcherInner,
    channel: NotificationChannel,
    config: &AlertConfig,
    event: &FrictionEventRow,
) -> ChannelOutcome {
    let result = match channel {
        NotificationChannel::Slack => send_slack(inner, config, event).await,
        NotificationChannel::Webhook => send_webhook(inner, config, event).await,
        NotificationChannel::Email => queue_email(inner, config, event).await,
    };
    match result {
        Ok(()) => ChannelOutcome {
            channel: channel.as_str().to_string(),
            success: true,
            error: None,
        },
        Err(err) => {
            warn!(
                "{} delivery failed for alert config {}: {}",
                channel.as_str(),
                config.id,
                err
            );
            ChannelOutcome {
                channel: channel.as_str().to_string(),
                success: false,
                error: Some(err.to_string()),
            }
        }
    }
}

async fn send_slack(
    inner: &DispatcherInner,
    config: &AlertConfig,
    event: &FrictionEventRow,
) -> anyhow::Result<()> {
    let url = config
        .conditions
        .slack_webhook_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("slack_webhook_url not configured"))?;

    let payload = json!({
        "blocks": [
            {
                "type": "header",
                "text": {"type": "plain_text", "text": "Friction spike detected"}
            },
            {
                "type": "section",
                "fields": [
                    {"type": "mrkdwn", "text": format!("*Event type:*\n{}", event.event_type)},
                    {"type": "mrkdwn", "text": format!("*Severity:*\n{}", event.severity_score)},
                    {"type": "mrkdwn", "text": format!("*Page:*\n{}", event.page_url)},
                    {"type": "mrkdwn", "text": format!("*Session:*\n{}", event.session_id)}
                ]
            }
        ]
    });

    inner
        .http
        .post(url)
        .json(&payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

async fn send_webhook(
    inner: &DispatcherInner,
    config: &AlertConfig,
    event: &FrictionEventRow,
) -> anyhow::Result<()> {
    let url = config
        .conditions
        .webhook_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("webhook_url not configured"))?;

    let payload = json!({
        "alertName": config.alert_type,
        "frictionEvent": event,
        "timestamp": current_millis(),
    });

    inner
        .http
        .post(url)
        .json(&payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

async fn queue_email(
    inner: &DispatcherInner,
    config: &AlertConfig,
    event: &FrictionEventRow,
) -> anyhow::Result<()> {
    let email = config
        .conditions
        .email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("email address not configured"))?;

    let mut outbox = inner.email_outbox.write().await;
    outbox.push(PendingEmail {
        email: email.to_string(),
        alert_id: config.id.clone(),
        event_type: event.event_type.clone(),
        severity_score: event.severity_score,
        created_at_ms: current_millis(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::AlertConditions;
    use time::OffsetDateTime;

    fn event(severity_score: u8) -> FrictionEventRow {
        FrictionEventRow {
            event_time: OffsetDateTime::UNIX_EPOCH,
            session_id: "s1".to_string(),
            event_type: "error".to_string(),
            element_selector: String::new(),
            page_url: "/checkout".to_string(),
            user_action: String::new(),
            error_message: String::new(),
            severity_score,
            metadata_json: "{}".to_string(),
        }
    }

    fn email_config(id: &str, min_severity: Option<u8>) -> AlertConfig {
        AlertConfig {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            alert_type: "friction_spike".to_string(),
            conditions: AlertConditions {
                min_severity,
                email: Some("ops@example.com".to_string()),
                ..AlertConditions::default()
            },
            notification_channels: vec!["email".to_string()],
            is_active: true,
            last_triggered_at: None,
        }
    }

    #[tokio::test]
    async fn min_severity_gates_dispatch() {
        let dispatcher = DefaultAlertDispatcher::new(5).expect("build dispatcher");
        let configs = vec![email_config("cfg-1", Some(8))];

        let outcomes = dispatcher.dispatch(&event(7), &configs).await;
        assert!(outcomes.is_empty());

        let outcomes = dispatcher.dispatch(&event(8), &configs).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert_eq!(dispatcher.pending_emails().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_channel_url_reports_failure_without_blocking_others() {
        let dispatcher = DefaultAlertDispatcher::new(5).expect("build dispatcher");
        let mut config = email_config("cfg-1", None);
        // Slack listed but no URL configured; email must still deliver.
        config.notification_channels = vec!["slack".to_string(), "email".to_string()];

        let outcomes = dispatcher.dispatch(&event(90), &[config]).await;
        assert_eq!(outcomes.len(), 2);
        let slack = outcomes
            .iter()
            .find(|outcome| outcome.channel == "slack")
            .expect("slack outcome");
        assert!(!slack.success);
        let email = outcomes
            .iter()
            .find(|outcome| outcome.channel == "email")
            .expect("email outcome");
        assert!(email.success);
    }

    #[tokio::test]
    async fn unknown_channel_names_are_skipped() {
        let dispatcher = DefaultAlertDispatcher::new(5).expect("build dispatcher");
        let mut config = email_config("cfg-1", None);
        config.notification_channels = vec!["pager".to_string(), "email".to_string()];

        let outcomes = dispatcher.dispatch(&event(90), &[config]).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].channel, "email");
    }

    #[tokio::test]
    async fn deliveries_are_recorded_most_recent_first() {
        let dispatcher = DefaultAlertDispatcher::new(5).expect("build dispatcher");
        let configs = vec![email_config("cfg-1", None), email_config("cfg-2", None)];

        dispatcher.dispatch(&event(90), &configs).await;

        let deliveries = dispatcher.list_deliveries(10).await;
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].config_id, "cfg-2");
        let last = dispatcher.last_delivery().await.expect("last delivery");
        assert_eq!(last.config_id, "cfg-2");
    }
}
