// Pure domain services: scoring and spike detection

pub mod scorer;
pub mod spike;

pub use spike::{scan, SpikeReport, SPIKE_HIGH_COUNT_THRESHOLD};
