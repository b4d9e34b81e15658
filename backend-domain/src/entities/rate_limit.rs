// Rate limit window entity
// Fixed-window counter keyed by (identifier, endpoint)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitWindow {
    pub identifier: String,
    pub endpoint: String,
    pub request_count: u32,
    pub window_start: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: i64,
}
