use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    ingest_requests: AtomicU64,
    ingest_events: AtomicU64,
    events_skipped: AtomicU64,
    events_failed: AtomicU64,
    rate_limited: AtomicU64,
    spikes: AtomicU64,
}

impl Metrics {
    pub fn record_ingest(&self, processed: usize) {
        self.ingest_requests.fetch_add(1, Ordering::Relaxed);
        self.ingest_events
            .fetch_add(processed as u64, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.events_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_failure(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_spike(&self) {
        self.spikes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let requests = self.ingest_requests.load(Ordering::Relaxed);
        let events = self.ingest_events.load(Ordering::Relaxed);
        let skipped = self.events_skipped.load(Ordering::Relaxed);
        let failed = self.events_failed.load(Ordering::Relaxed);
        let rate_limited = self.rate_limited.load(Ordering::Relaxed);
        let spikes = self.spikes.load(Ordering::Relaxed);

        format!(
            "# TYPE uxlens_ingest_requests_total counter\n\
uxlens_ingest_requests_total {}\n\
# TYPE uxlens_ingest_events_total counter\n\
uxlens_ingest_events_total {}\n\
# TYPE uxlens_events_skipped_total counter\n\
uxlens_events_skipped_total {}\n\
# TYPE uxlens_events_failed_total counter\n\
uxlens_events_failed_total {}\n\
# TYPE uxlens_rate_limited_total counter\n\
uxlens_rate_limited_total {}\n\
# TYPE uxlens_friction_spikes_total counter\n\
uxlens_friction_spikes_total {}\n",
            requests, events, skipped, failed, rate_limited, spikes
        )
    }
}
