pub mod spike_stream_hub;

pub use spike_stream_hub::{ConnectionRegistry, InProcessRegistry};
