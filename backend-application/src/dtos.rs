use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Breakdown {
    pub friction: usize,
    pub heatmap: usize,
    pub performance: usize,
}

/// Per-batch processing summary. `processed` counts only events that were
/// actually persisted; partial success is visible here, never hidden.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub processed: usize,
    pub breakdown: Breakdown,
    pub high_severity_count: usize,
    pub spike_detected: bool,
}
