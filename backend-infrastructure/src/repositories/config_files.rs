use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use backend_domain::ports::{AlertConfigRepository, ApiKeyRepository};
use backend_domain::{AlertConfig, ApiKeyRecord};

/// API key records come from the account service and are read-only here;
/// a YAML export is loaded once at startup. Only `last_used_at` mutates,
/// in memory, as an ingestion side effect.
pub struct ApiKeyFileRepository {
    records: RwLock<HashMap<String, ApiKeyRecord>>,
}

impl ApiKeyFileRepository {
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            warn!("api key file {} not found, starting with no keys", path);
            return Ok(Self::from_records(Vec::new()));
        }
        let content = fs::read_to_string(path).await?;
        let records: Vec<ApiKeyRecord> = serde_yaml::from_str(&content)?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<ApiKeyRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.api_key.clone(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ApiKeyRepository for ApiKeyFileRepository {
    async fn find(&self, api_key: &str) -> anyhow::Result<Option<ApiKeyRecord>> {
        let records = self.records.read().await;
        Ok(records.get(api_key).cloned())
    }

    async fn touch_last_used(&self, api_key: &str, at_ms: i64) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(api_key) {
            record.last_used_at = Some(at_ms);
        }
        Ok(())
    }
}

/// Alert configurations are authored in the dashboard; this core only reads
/// them and stamps `last_triggered_at` after a successful spike dispatch.
pub struct AlertConfigFileRepository {
    configs: RwLock<Vec<AlertConfig>>,
}

impl AlertConfigFileRepository {
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            warn!("alert config file {} not found, alerting disabled", path);
            return Ok(Self::from_configs(Vec::new()));
        }
        let content = fs::read_to_string(path).await?;
        let configs: Vec<AlertConfig> = serde_yaml::from_str(&content)?;
        Ok(Self::from_configs(configs))
    }

    pub fn from_configs(configs: Vec<AlertConfig>) -> Self {
        Self {
            configs: RwLock::new(configs),
        }
    }
}

#[async_trait]
impl AlertConfigRepository for AlertConfigFileRepository {
    async fn list_active(&self, alert_type: &str) -> anyhow::Result<Vec<AlertConfig>> {
        let configs = self.configs.read().await;
        Ok(configs
            .iter()
            .filter(|config| config.alert_type == alert_type && config.is_active)
            .cloned()
            .collect())
    }

    async fn touch_triggered(&self, id: &str, at_ms: i64) -> anyhow::Result<()> {
        let mut configs = self.configs.write().await;
        if let Some(config) = configs.iter_mut().find(|config| config.id == id) {
            config.last_triggered_at = Some(at_ms);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::AlertConditions;

    fn key(api_key: &str, is_active: bool) -> ApiKeyRecord {
        ApiKeyRecord {
            api_key: api_key.to_string(),
            user_id: "user-1".to_string(),
            is_active,
            rate_limit_per_minute: 600,
            allowed_domains: None,
            last_used_at: None,
        }
    }

    #[tokio::test]
    async fn find_and_touch_round_trip() {
        let repo = ApiKeyFileRepository::from_records(vec![key("uxl-a", true)]);
        assert!(repo.find("uxl-a").await.expect("find").is_some());
        assert!(repo.find("uxl-b").await.expect("find").is_none());

        repo.touch_last_used("uxl-a", 42).await.expect("touch");
        let record = repo.find("uxl-a").await.expect("find").expect("record");
        assert_eq!(record.last_used_at, Some(42));
    }

    #[tokio::test]
    async fn list_active_filters_type_and_activity() {
        let mk = |id: &str, alert_type: &str, is_active: bool| AlertConfig {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            alert_type: alert_type.to_string(),
            conditions: AlertConditions::default(),
            notification_channels: Vec::new(),
            is_active,
            last_triggered_at: None,
        };
        let repo = AlertConfigFileRepository::from_configs(vec![
            mk("a", "friction_spike", true),
            mk("b", "friction_spike", false),
            mk("c", "error_rate", true),
        ]);

        let active = repo.list_active("friction_spike").await.expect("list");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a");
    }
}
