use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::ports::{EventStore, RateLimitStore};
use backend_domain::{
    FrictionEventRow,
    HeatmapAggregate,
    HeatmapDelta,
    HeatmapKey,
    PerformanceRow,
    RateLimitWindow,
};

/// Single-node store for development runs and tests. Mirrors the ClickHouse
/// merge semantics: heatmap upserts fold into one aggregate per key.
#[derive(Default)]
pub struct MemoryEventStore {
    friction: RwLock<Vec<FrictionEventRow>>,
    performance: RwLock<Vec<PerformanceRow>>,
    heatmap: RwLock<HashMap<HeatmapKey, HeatmapAggregate>>,
}

impl MemoryEventStore {
    pub async fn friction_events(&self) -> Vec<FrictionEventRow> {
        self.friction.read().await.clone()
    }

    pub async fn performance_rows(&self) -> Vec<PerformanceRow> {
        self.performance.read().await.clone()
    }

    pub async fn heatmap_aggregate(&self, key: &HeatmapKey) -> Option<HeatmapAggregate> {
        self.heatmap.read().await.get(key).cloned()
    }

    pub async fn heatmap_row_count(&self) -> usize {
        self.heatmap.read().await.len()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert_friction_events(&self, rows: &[FrictionEventRow]) -> anyhow::Result<()> {
        self.friction.write().await.extend_from_slice(rows);
        Ok(())
    }

    async fn insert_performance_rows(&self, rows: &[PerformanceRow]) -> anyhow::Result<()> {
        self.performance.write().await.extend_from_slice(rows);
        Ok(())
    }

    async fn upsert_heatmap(&self, delta: &HeatmapDelta) -> anyhow::Result<()> {
        let mut heatmap = self.heatmap.write().await;
        heatmap.entry(delta.key()).or_default().merge(delta);
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Per-node window table. Counts are node-local, so the enforced ceiling
/// is approximate on a multi-node deployment; a shared store can be
/// swapped in behind the same port.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    windows: RwLock<HashMap<(String, String), RateLimitWindow>>,
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn fetch(
        &self,
        identifier: &str,
        endpoint: &str,
    ) -> anyhow::Result<Option<RateLimitWindow>> {
        let windows = self.windows.read().await;
        Ok(windows
            .get(&(identifier.to_string(), endpoint.to_string()))
            .cloned())
    }

    async fn store(&self, window: &RateLimitWindow) -> anyhow::Result<()> {
        let mut windows = self.windows.write().await;
        windows.insert(
            (window.identifier.clone(), window.endpoint.clone()),
            window.clone(),
        );
        Ok(())
    }
}
