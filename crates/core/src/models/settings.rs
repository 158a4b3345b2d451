use serde::{Deserialize, Serialize};

use super::holding::Metal;

/// Spot price endpoint of the Stack Tracker backend.
pub const DEFAULT_API_BASE_URL: &str = "https://stack-tracker-pro-production.up.railway.app";

/// User-configurable settings, persisted next to the holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the spot price API (`{base}/api/spot-prices`).
    pub api_base_url: String,

    /// HTTP timeout for spot price requests, in seconds.
    pub request_timeout_secs: u64,

    /// Optional metals.dev API key. When set, metals.dev is used as a
    /// fallback spot source.
    pub metals_dev_api_key: Option<String>,

    /// Metal preselected in the form for new holdings.
    pub default_metal: Metal,

    /// Number of purchases shown on the dashboard.
    pub recent_holdings_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            metals_dev_api_key: None,
            default_metal: Metal::Silver,
            recent_holdings_limit: 5,
        }
    }
}
