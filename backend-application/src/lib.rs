// Backend Application Layer

pub mod commands;
pub mod dtos;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod ops;
pub mod state;

pub use dtos::{Breakdown, IngestSummary};
pub use error::AppError;
pub use metrics::Metrics;
pub use state::AppState;
