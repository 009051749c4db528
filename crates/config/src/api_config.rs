//! Remote catalog API configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Where the catalog server lives and how patiently to talk to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the catalog REST API
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries of a failed read request after the first attempt
    pub max_retries: u32,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            user_agent: format!("Libris/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ConfigSection for ApiConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::http_url(&self.base_url, "api.base_url"),
            Validator::in_range(self.timeout_secs, 1, 300, "api.timeout_secs"),
            Validator::in_range(self.max_retries, 1, 10, "api.max_retries"),
            Validator::not_empty(&self.user_agent, "api.user_agent"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.base_url = other.base_url;
        self.timeout_secs = other.timeout_secs;
        self.max_retries = other.max_retries;
        self.user_agent = other.user_agent;
    }

    fn section_name(&self) -> &'static str {
        "api"
    }
}
