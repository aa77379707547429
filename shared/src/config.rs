use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{SpaceXApi, DEFAULT_BASE_URL};
use crate::navigation::DevicePlatform;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Largest real-world UTC offset is +14:00.
const MAX_UTC_OFFSET_MINUTES: u32 = 14 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid api_base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("utc_offset_minutes {0} is outside -840..=840")]
    OffsetOutOfRange(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default)]
    pub platform: DevicePlatform,

    /// Zone used for absolute launch dates; the shell passes the device offset.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            search_limit: default_search_limit(),
            search_debounce_ms: default_search_debounce_ms(),
            platform: DevicePlatform::default(),
            utc_offset_minutes: 0,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.api_base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.api_base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Zero { field: "page_size" });
        }
        if self.search_limit == 0 {
            return Err(ConfigError::Zero {
                field: "search_limit",
            });
        }
        if self.utc_offset_minutes.unsigned_abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::OffsetOutOfRange(self.utc_offset_minutes));
        }
        Ok(())
    }

    pub fn api(&self) -> SpaceXApi {
        SpaceXApi::new(self.api_base_url.as_str())
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}
