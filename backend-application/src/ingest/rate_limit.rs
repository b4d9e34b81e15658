use tracing::warn;

use backend_domain::ports::RateLimitStore;
use backend_domain::utils::current_millis;
use backend_domain::{RateLimitConfig, RateLimitDecision, RateLimitWindow};

pub const INGEST_ENDPOINT: &str = "ingest";

/// Window identifier for one API key at one moment: the minute bucket in
/// the identifier starts a fresh window on minute boundaries even if a
/// stale row lingers in the store.
pub fn window_identifier(api_key: &str, now_ms: i64) -> String {
    format!("{}:{}", api_key, now_ms / 60_000)
}

/// Fixed-window check. Any store error fails open: availability of ingestion
/// outranks strict enforcement, so a storage blip grants at most a brief
/// window of extra throughput instead of an outage.
pub async fn check_rate_limit(
    store: &dyn RateLimitStore,
    identifier: &str,
    endpoint: &str,
    config: RateLimitConfig,
) -> RateLimitDecision {
    let now = current_millis();
    match evaluate(store, identifier, endpoint, config, now).await {
        Ok(decision) => decision,
        Err(err) => {
            warn!("rate limit store unavailable, failing open: {}", err);
            RateLimitDecision {
                allowed: true,
                remaining: config.max_requests.saturating_sub(1),
                reset_at: now + config.window_ms,
            }
        }
    }
}

async fn evaluate(
    store: &dyn RateLimitStore,
    identifier: &str,
    endpoint: &str,
    config: RateLimitConfig,
    now: i64,
) -> anyhow::Result<RateLimitDecision> {
    let existing = store.fetch(identifier, endpoint).await?;

    let window = match existing {
        Some(window) if now < window.window_start + config.window_ms => window,
        // Absent or expired: the window restarts with this request.
        _ => {
            let fresh = RateLimitWindow {
                identifier: identifier.to_string(),
                endpoint: endpoint.to_string(),
                request_count: 1,
                window_start: now,
            };
            store.store(&fresh).await?;
            return Ok(RateLimitDecision {
                allowed: true,
                remaining: config.max_requests.saturating_sub(1),
                reset_at: now + config.window_ms,
            });
        }
    };

    if window.request_count >= config.max_requests {
        // Rejected requests are not counted against the window again.
        return Ok(RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: window.window_start + config.window_ms,
        });
    }

    let incremented = RateLimitWindow {
        request_count: window.request_count + 1,
        ..window
    };
    store.store(&incremented).await?;
    Ok(RateLimitDecision {
        allowed: true,
        remaining: config.max_requests - incremented.request_count,
        reset_at: incremented.window_start + config.window_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        windows: Mutex<HashMap<(String, String), RateLimitWindow>>,
    }

    #[async_trait]
    impl RateLimitStore for MapStore {
        async fn fetch(
            &self,
            identifier: &str,
            endpoint: &str,
        ) -> anyhow::Result<Option<RateLimitWindow>> {
            let windows = self.windows.lock().await;
            Ok(windows
                .get(&(identifier.to_string(), endpoint.to_string()))
                .cloned())
        }

        async fn store(&self, window: &RateLimitWindow) -> anyhow::Result<()> {
            let mut windows = self.windows.lock().await;
            windows.insert(
                (window.identifier.clone(), window.endpoint.clone()),
                window.clone(),
            );
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl RateLimitStore for BrokenStore {
        async fn fetch(
            &self,
            _identifier: &str,
            _endpoint: &str,
        ) -> anyhow::Result<Option<RateLimitWindow>> {
            anyhow::bail!("store offline")
        }

        async fn store(&self, _window: &RateLimitWindow) -> anyhow::Result<()> {
            anyhow::bail!("store offline")
        }
    }

    fn config() -> RateLimitConfig {
        RateLimitConfig {
            max_requests: 3,
            window_ms: 60_000,
        }
    }

    #[tokio::test]
    async fn sequential_calls_exhaust_the_window() {
        let store = MapStore::default();
        let mut allowed = Vec::new();
        let mut remaining = Vec::new();
        for _ in 0..4 {
            let decision = check_rate_limit(&store, "key-1", INGEST_ENDPOINT, config()).await;
            allowed.push(decision.allowed);
            remaining.push(decision.remaining);
        }
        assert_eq!(allowed, vec![true, true, true, false]);
        assert_eq!(remaining, vec![2, 1, 0, 0]);
    }

    #[tokio::test]
    async fn rejection_does_not_increment_the_counter() {
        let store = MapStore::default();
        for _ in 0..5 {
            check_rate_limit(&store, "key-1", INGEST_ENDPOINT, config()).await;
        }
        let windows = store.windows.lock().await;
        let window = windows
            .get(&("key-1".to_string(), INGEST_ENDPOINT.to_string()))
            .expect("window exists");
        assert_eq!(window.request_count, 3);
    }

    #[tokio::test]
    async fn expired_window_resets_regardless_of_prior_count() {
        let store = MapStore::default();
        let stale = RateLimitWindow {
            identifier: "key-1".to_string(),
            endpoint: INGEST_ENDPOINT.to_string(),
            request_count: 99,
            window_start: current_millis() - 120_000,
        };
        store.store(&stale).await.expect("seed window");

        let decision = check_rate_limit(&store, "key-1", INGEST_ENDPOINT, config()).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[tokio::test]
    async fn store_failure_fails_open() {
        let decision = check_rate_limit(&BrokenStore, "key-1", INGEST_ENDPOINT, config()).await;
        assert!(decision.allowed);
    }
}
