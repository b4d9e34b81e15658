use async_trait::async_trait;

use crate::entities::{
    AlertConfig,
    ApiKeyRecord,
    FrictionEventRow,
    HeatmapDelta,
    PerformanceRow,
    RateLimitWindow,
};

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn insert_friction_events(&self, rows: &[FrictionEventRow]) -> anyhow::Result<()>;
    async fn insert_performance_rows(&self, rows: &[PerformanceRow]) -> anyhow::Result<()>;
    /// Additive merge into the aggregate identified by the delta's key;
    /// never an overwrite.
    async fn upsert_heatmap(&self, delta: &HeatmapDelta) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn find(&self, api_key: &str) -> anyhow::Result<Option<ApiKeyRecord>>;
    async fn touch_last_used(&self, api_key: &str, at_ms: i64) -> anyhow::Result<()>;
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn fetch(
        &self,
        identifier: &str,
        endpoint: &str,
    ) -> anyhow::Result<Option<RateLimitWindow>>;
    async fn store(&self, window: &RateLimitWindow) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AlertConfigRepository: Send + Sync {
    async fn list_active(&self, alert_type: &str) -> anyhow::Result<Vec<AlertConfig>>;
    async fn touch_triggered(&self, id: &str, at_ms: i64) -> anyhow::Result<()>;
}
