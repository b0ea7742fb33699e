//! Client configuration model.
//!
//! Loading and environment overrides live in the infrastructure crate; this
//! module only defines the shape and defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::remote::{MethodOverrides, MethodTable};

fn default_backend_url() -> String {
    "http://127.0.0.1:4943".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_chat_poll_interval_ms() -> u64 {
    1000
}

fn default_page_size() -> u32 {
    crate::chat::DEFAULT_PAGE_LIMIT
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend actor gateway.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Polling period for chat views.
    #[serde(default = "default_chat_poll_interval_ms")]
    pub chat_poll_interval_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Attempts for queries that opt into retry.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Directory for the per-identity budget ledger. Resolved by the
    /// infrastructure layer when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub methods: MethodOverrides,
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_millis(self.chat_poll_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// The deployed method table with this config's overrides applied.
    pub fn method_table(&self) -> Result<MethodTable> {
        MethodTable::deployed().with_overrides(&self.methods)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            chat_poll_interval_ms: default_chat_poll_interval_ms(),
            page_size: default_page_size(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            ledger_dir: None,
            log_level: default_log_level(),
            methods: MethodOverrides::default(),
        }
    }
}
