use std::fs;
use std::path::Path;
use std::time::Duration;

use matcher_core::{AppSettings, PollSettings};
use matcher_engine::{ClientSettings, DEFAULT_API_BASE_URL};
use matcher_logging::{matcher_debug, matcher_info, matcher_warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "matcher.ron";
/// Lower bound for configured poll delays.
const MIN_POLL_DELAY_SECS: u64 = 1;

/// Settings read from `matcher.ron`. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_retry_secs: u64,
    pub max_poll_failures: Option<u32>,
    pub default_limit: u32,
    pub default_score_percent: u8,
    pub max_export_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            poll_interval_secs: 3,
            poll_retry_secs: 5,
            max_poll_failures: None,
            default_limit: matcher_core::LIMIT_DEFAULT,
            default_score_percent: matcher_core::SCORE_PERCENT_DEFAULT,
            max_export_bytes: 50 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_export_bytes: self.max_export_bytes,
        }
    }

    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            default_limit: self.default_limit,
            default_score_percent: self.default_score_percent,
            poll: PollSettings {
                interval: poll_delay("poll_interval_secs", self.poll_interval_secs),
                retry_delay: poll_delay("poll_retry_secs", self.poll_retry_secs),
                max_consecutive_failures: self.max_poll_failures,
            },
        }
    }
}

fn poll_delay(field: &str, secs: u64) -> Duration {
    if secs < MIN_POLL_DELAY_SECS {
        matcher_warn!(
            "{} = {} is too short; using {}s",
            field,
            secs,
            MIN_POLL_DELAY_SECS
        );
        return Duration::from_secs(MIN_POLL_DELAY_SECS);
    }
    Duration::from_secs(secs)
}

/// Loads the config file, falling back to defaults when it is absent or bad.
pub(crate) fn load(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            matcher_debug!("No config at {:?}; using defaults", path);
            return AppConfig::default();
        }
        Err(err) => {
            matcher_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            matcher_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            matcher_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}
