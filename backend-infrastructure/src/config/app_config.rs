use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, RuntimeConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Optional bearer token for ops/stream routes; ingestion itself is
    /// authenticated per customer API key, not by this token.
    pub ops_token: Option<String>,
    /// "clickhouse" or "memory".
    pub storage: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub api_keys_path: String,
    pub alert_configs_path: String,
    pub rate_limit_window_seconds: u64,
    pub notification_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            ops_token: None,
            storage: "clickhouse".to_string(),
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "uxlens".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            api_keys_path: "./api_keys.yaml".to_string(),
            alert_configs_path: "./alert_configs.yaml".to_string(),
            rate_limit_window_seconds: 60,
            notification_timeout_seconds: 8,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("UXLENS_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(token) = &self.ops_token {
            if token.trim().is_empty() {
                self.ops_token = None;
            }
        }
        if let Some(user) = &self.clickhouse_user {
            if user.trim().is_empty() {
                self.clickhouse_user = None;
            }
        }
        if let Some(password) = &self.clickhouse_password {
            if password.trim().is_empty() {
                self.clickhouse_password = None;
            }
        }
        self.storage = self.storage.trim().to_lowercase();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.api_keys_path = resolve_path(base, &self.api_keys_path);
        self.alert_configs_path = resolve_path(base, &self.alert_configs_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.storage != "clickhouse" && self.storage != "memory" {
            return Err(anyhow!(
                "storage must be 'clickhouse' or 'memory', got '{}'",
                self.storage
            ));
        }
        if self.rate_limit_window_seconds == 0 {
            return Err(anyhow!("rate_limit_window_seconds must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            ops_token: self.ops_token.clone(),
            api_keys_path: self.api_keys_path.clone(),
            alert_configs_path: self.alert_configs_path.clone(),
            rate_limit_window_seconds: self.rate_limit_window_seconds,
            notification_timeout_seconds: self.notification_timeout_seconds,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("UXLENS_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("UXLENS_OPS_TOKEN") {
            self.ops_token = Some(value);
        }
        if let Ok(value) = env::var("UXLENS_STORAGE") {
            self.storage = value;
        }
        if let Ok(value) = env::var("UXLENS_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("UXLENS_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("UXLENS_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("UXLENS_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("UXLENS_API_KEYS_PATH") {
            self.api_keys_path = value;
        }
        if let Ok(value) = env::var("UXLENS_ALERT_CONFIGS_PATH") {
            self.alert_configs_path = value;
        }
        if let Ok(value) = env::var("UXLENS_RATE_LIMIT_WINDOW_SECONDS") {
            self.rate_limit_window_seconds =
                value.parse().unwrap_or(self.rate_limit_window_seconds);
        }
        if let Ok(value) = env::var("UXLENS_NOTIFICATION_TIMEOUT_SECONDS") {
            self.notification_timeout_seconds =
                value.parse().unwrap_or(self.notification_timeout_seconds);
        }
        if let Ok(value) = env::var("UXLENS_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("UXLENS_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = AppConfig::default();
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn unknown_storage_backend_is_rejected() {
        let config = AppConfig {
            storage: "postgres".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn normalize_drops_blank_optionals() {
        let mut config = AppConfig {
            ops_token: Some("   ".to_string()),
            clickhouse_user: Some(String::new()),
            storage: " ClickHouse ".to_string(),
            ..AppConfig::default()
        };
        config.normalize();
        assert!(config.ops_token.is_none());
        assert!(config.clickhouse_user.is_none());
        assert_eq!(config.storage, "clickhouse");
    }
}
