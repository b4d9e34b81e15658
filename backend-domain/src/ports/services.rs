use async_trait::async_trait;

use crate::entities::{AlertConfig, AlertDeliveryRecord, ChannelOutcome, FrictionEventRow};

#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    /// Fire-and-forget fan-out; delivery failures are logged, never
    /// propagated to the ingestion path.
    fn spawn_dispatch(&self, event: FrictionEventRow, configs: Vec<AlertConfig>);

    /// Settle-all dispatch: every channel of every matching config runs to
    /// completion and reports its own outcome.
    async fn dispatch(
        &self,
        event: &FrictionEventRow,
        configs: &[AlertConfig],
    ) -> Vec<ChannelOutcome>;

    async fn list_deliveries(&self, limit: usize) -> Vec<AlertDeliveryRecord>;
    async fn last_delivery(&self) -> Option<AlertDeliveryRecord>;
}
