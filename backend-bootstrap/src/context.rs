use std::sync::Arc;

use anyhow::Result;
use clickhouse::Client;
use tracing::info;

use backend_application::ops::InProcessRegistry;
use backend_application::{AppState, Metrics};
use backend_domain::ports::EventStore;
use backend_infrastructure::{
    AlertConfigFileRepository, ApiKeyFileRepository, AppConfig, ClickhouseStore,
    DefaultAlertDispatcher, MemoryEventStore, MemoryRateLimitStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let event_store: Arc<dyn EventStore> = match config.storage.as_str() {
            "memory" => {
                info!("using in-memory event store");
                Arc::new(MemoryEventStore::default())
            }
            _ => {
                let db_config = config.to_db_config();
                let mut clickhouse = Client::default()
                    .with_url(&db_config.clickhouse_url)
                    .with_database(&db_config.clickhouse_database);
                if let Some(user) = &db_config.clickhouse_user {
                    clickhouse = clickhouse.with_user(user);
                }
                if let Some(password) = &db_config.clickhouse_password {
                    clickhouse = clickhouse.with_password(password);
                }

                let store = Arc::new(ClickhouseStore::new(
                    clickhouse,
                    db_config.clickhouse_database.clone(),
                ));
                store.ensure_schema().await?;
                store
            }
        };

        let api_keys = ApiKeyFileRepository::load(&runtime_config.api_keys_path).await?;
        let alert_configs =
            AlertConfigFileRepository::load(&runtime_config.alert_configs_path).await?;
        let dispatcher =
            DefaultAlertDispatcher::new(runtime_config.notification_timeout_seconds)?;

        let state = AppState {
            config: runtime_config,
            event_store,
            api_keys: Arc::new(api_keys),
            rate_limits: Arc::new(MemoryRateLimitStore::default()),
            alert_configs: Arc::new(alert_configs),
            dispatcher: Arc::new(dispatcher),
            spike_stream: Arc::new(InProcessRegistry::default()),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
