use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use backend_domain::SpikeNotice;

/// Registry of live dashboard connections interested in spike notices. The
/// call-site contract stays the same whether the backing is this in-process
/// map or a pub/sub channel on a multi-node deployment.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    async fn register(&self, id: &str) -> mpsc::UnboundedReceiver<SpikeNotice>;
    async fn unregister(&self, id: &str);
    async fn broadcast_all(&self, notice: &SpikeNotice);
}

#[derive(Default)]
pub struct InProcessRegistry {
    clients: RwLock<HashMap<String, mpsc::UnboundedSender<SpikeNotice>>>,
}

#[async_trait]
impl ConnectionRegistry for InProcessRegistry {
    async fn register(&self, id: &str) -> mpsc::UnboundedReceiver<SpikeNotice> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut clients = self.clients.write().await;
        clients.insert(id.to_string(), tx);
        rx
    }

    async fn unregister(&self, id: &str) {
        let mut clients = self.clients.write().await;
        clients.remove(id);
    }

    async fn broadcast_all(&self, notice: &SpikeNotice) {
        let mut clients = self.clients.write().await;
        // A failed send means the receiver hung up; drop the registration.
        clients.retain(|_, tx| tx.send(notice.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> SpikeNotice {
        SpikeNotice {
            timestamp_ms: 1,
            user_id: "user-1".to_string(),
            high_severity_count: 6,
            page_url: "/checkout".to_string(),
            top_severity: 100,
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_registered_client() {
        let registry = InProcessRegistry::default();
        let mut first = registry.register("a").await;
        let mut second = registry.register("b").await;

        registry.broadcast_all(&notice()).await;

        assert_eq!(first.recv().await.expect("first notice").user_id, "user-1");
        assert_eq!(second.recv().await.expect("second notice").user_id, "user-1");
    }

    #[tokio::test]
    async fn unregistered_client_stops_receiving() {
        let registry = InProcessRegistry::default();
        let mut rx = registry.register("a").await;
        registry.unregister("a").await;

        registry.broadcast_all(&notice()).await;
        assert!(rx.recv().await.is_none());
    }
}
