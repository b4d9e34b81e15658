pub mod rate_limit;

pub use rate_limit::{check_rate_limit, window_identifier, INGEST_ENDPOINT};
