// Heatmap aggregate entity
// Rolled-up interaction counts and friction scores, one row per
// (page, element, interaction type) per day

use clickhouse::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeatmapKey {
    pub page_url: String,
    pub element_selector: String,
    pub interaction_type: String,
    /// UTC day bucket, `YYYY-MM-DD`.
    pub date_bucket: String,
}

/// One upsert's contribution to an aggregate. Counts and sums are additive,
/// so concurrent deltas for the same key merge commutatively regardless of
/// arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct HeatmapDelta {
    pub date_bucket: String,
    pub page_url: String,
    pub element_selector: String,
    pub interaction_type: String,
    pub interaction_count: u64,
    pub score_sum: u64,
    pub duration_ms_sum: u64,
}

impl HeatmapDelta {
    pub fn single(key: &HeatmapKey, friction_score: u8, duration_ms: u64) -> Self {
        Self {
            date_bucket: key.date_bucket.clone(),
            page_url: key.page_url.clone(),
            element_selector: key.element_selector.clone(),
            interaction_type: key.interaction_type.clone(),
            interaction_count: 1,
            score_sum: u64::from(friction_score),
            duration_ms_sum: duration_ms,
        }
    }

    pub fn key(&self) -> HeatmapKey {
        HeatmapKey {
            page_url: self.page_url.clone(),
            element_selector: self.element_selector.clone(),
            interaction_type: self.interaction_type.clone(),
            date_bucket: self.date_bucket.clone(),
        }
    }
}

/// Materialized aggregate as read back for dashboards and tests. The
/// displayed friction score is the running average of all merged deltas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeatmapAggregate {
    pub interaction_count: u64,
    pub score_sum: u64,
    pub duration_ms_sum: u64,
}

impl HeatmapAggregate {
    pub fn merge(&mut self, delta: &HeatmapDelta) {
        self.interaction_count += delta.interaction_count;
        self.score_sum += delta.score_sum;
        self.duration_ms_sum += delta.duration_ms_sum;
    }

    pub fn friction_score(&self) -> u64 {
        if self.interaction_count == 0 {
            0
        } else {
            self.score_sum / self.interaction_count
        }
    }

    pub fn avg_duration_ms(&self) -> u64 {
        if self.interaction_count == 0 {
            0
        } else {
            self.duration_ms_sum / self.interaction_count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> HeatmapKey {
        HeatmapKey {
            page_url: "/checkout".to_string(),
            element_selector: "button#pay".to_string(),
            interaction_type: "click".to_string(),
            date_bucket: "2026-08-31".to_string(),
        }
    }

    #[test]
    fn merge_is_additive_and_averages_scores() {
        let mut aggregate = HeatmapAggregate::default();
        aggregate.merge(&HeatmapDelta::single(&key(), 80, 100));
        aggregate.merge(&HeatmapDelta::single(&key(), 40, 300));
        assert_eq!(aggregate.interaction_count, 2);
        assert_eq!(aggregate.friction_score(), 60);
        assert_eq!(aggregate.avg_duration_ms(), 200);
    }

    #[test]
    fn empty_aggregate_reports_zero_scores() {
        let aggregate = HeatmapAggregate::default();
        assert_eq!(aggregate.friction_score(), 0);
        assert_eq!(aggregate.avg_duration_ms(), 0);
    }
}
