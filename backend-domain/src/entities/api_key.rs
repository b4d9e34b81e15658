// API key entity
// Read-only customer credential record; only last_used_at mutates

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub api_key: String,
    pub user_id: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<i64>,
}

fn default_active() -> bool {
    true
}

fn default_rate_limit() -> u32 {
    600
}
