use serde::Serialize;

use crate::entities::FrictionEventRow;
use crate::value_objects::HIGH_SEVERITY_THRESHOLD;

/// A batch needs strictly more than this many high-severity events to count
/// as a spike.
pub const SPIKE_HIGH_COUNT_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpikeReport {
    pub spike_detected: bool,
    pub high_severity_count: usize,
}

/// Scans one batch's scored friction events. Batch-local only; cross-batch
/// state never feeds into this decision.
pub fn scan(batch: &[FrictionEventRow]) -> SpikeReport {
    let high_severity_count = batch
        .iter()
        .filter(|event| event.severity_score >= HIGH_SEVERITY_THRESHOLD)
        .count();
    SpikeReport {
        spike_detected: high_severity_count > SPIKE_HIGH_COUNT_THRESHOLD,
        high_severity_count,
    }
}
