use async_trait::async_trait;
use clickhouse::Client;

use backend_domain::ports::EventStore;
use backend_domain::{FrictionEventRow, HeatmapDelta, PerformanceRow};

/// ClickHouse-backed event store. Friction events and performance metrics
/// are append-only MergeTree tables; the heatmap table is a
/// SummingMergeTree, so each upsert is just a delta insert and the engine
/// merges counts and sums additively per key. That delegates the
/// atomic-increment requirement to the store and keeps concurrent upserts
/// commutative.
pub struct ClickhouseStore {
    client: Client,
    database: String,
}

const CREATE_FRICTION_EVENTS: &str = r#"
CREATE TABLE IF NOT EXISTS {db}.friction_events (
    event_time DateTime64(3),
    session_id String,
    event_type LowCardinality(String),
    element_selector String,
    page_url String,
    user_action String,
    error_message String,
    severity_score UInt8,
    metadata_json String
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(event_time)
ORDER BY (event_time, session_id)
"#;

const CREATE_PERFORMANCE_METRICS: &str = r#"
CREATE TABLE IF NOT EXISTS {db}.performance_metrics (
    event_time DateTime64(3),
    session_id String,
    page_url String,
    metric_name LowCardinality(String),
    value_ms Float64,
    metadata_json String
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(event_time)
ORDER BY (event_time, session_id)
"#;

const CREATE_HEATMAP_DAILY: &str = r#"
CREATE TABLE IF NOT EXISTS {db}.heatmap_daily (
    date_bucket String,
    page_url String,
    element_selector String,
    interaction_type LowCardinality(String),
    interaction_count UInt64,
    score_sum UInt64,
    duration_ms_sum UInt64
)
ENGINE = SummingMergeTree((interaction_count, score_sum, duration_ms_sum))
ORDER BY (page_url, element_selector, interaction_type, date_bucket)
"#;

impl ClickhouseStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    async fn execute_ddl(&self, ddl: &str) -> anyhow::Result<()> {
        let sql = ddl.replace("{db}", &self.database);
        self.client.query(&sql).execute().await?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for ClickhouseStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.client
            .query(&format!("CREATE DATABASE IF NOT EXISTS {}", self.database))
            .execute()
            .await?;
        self.execute_ddl(CREATE_FRICTION_EVENTS).await?;
        self.execute_ddl(CREATE_PERFORMANCE_METRICS).await?;
        self.execute_ddl(CREATE_HEATMAP_DAILY).await?;
        Ok(())
    }

    async fn insert_friction_events(&self, rows: &[FrictionEventRow]) -> anyhow::Result<()> {
        let mut insert = self.client.insert("friction_events")?;
        for row in rows {
            insert.write(row).await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn insert_performance_rows(&self, rows: &[PerformanceRow]) -> anyhow::Result<()> {
        let mut insert = self.client.insert("performance_metrics")?;
        for row in rows {
            insert.write(row).await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn upsert_heatmap(&self, delta: &HeatmapDelta) -> anyhow::Result<()> {
        let mut insert = self.client.insert("heatmap_daily")?;
        insert.write(delta).await?;
        insert.end().await?;
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.client.query("SELECT 1").fetch_one::<u8>().await?;
        Ok(())
    }
}
