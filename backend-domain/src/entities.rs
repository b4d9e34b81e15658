pub mod alert_config;
pub mod api_key;
pub mod friction_event;
pub mod heatmap;
pub mod rate_limit;
pub mod runtime;
pub mod tracking_event;

pub use alert_config::*;
pub use api_key::*;
pub use friction_event::*;
pub use heatmap::*;
pub use rate_limit::*;
pub use runtime::*;
pub use tracking_event::*;
