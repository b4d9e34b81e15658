use std::sync::Arc;

use backend_domain::ports::{
    AlertConfigRepository,
    AlertDispatcher,
    ApiKeyRepository,
    EventStore,
    RateLimitStore,
};
use backend_domain::RuntimeConfig;

use crate::ops::ConnectionRegistry;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_store: Arc<dyn EventStore>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub rate_limits: Arc<dyn RateLimitStore>,
    pub alert_configs: Arc<dyn AlertConfigRepository>,
    pub dispatcher: Arc<dyn AlertDispatcher>,
    pub spike_stream: Arc<dyn ConnectionRegistry>,
    pub metrics: Arc<Metrics>,
}
