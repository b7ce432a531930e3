//! Runtime configuration.
//!
//! The host passes a JSON document (every field optional) and may let the
//! process environment override the backend endpoint. Presentation
//! placeholders such as the baseline stats and avatar URLs live here rather
//! than in the derivation code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DashboardStats;

pub const DEFAULT_CRASH_LOG_CAPACITY: usize = 100;

const DEFAULT_AVATARS: [&str; 5] = [
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1494790108755-2616b612b786?w=150&h=150&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=150&h=150&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=150&h=150&fit=crop&crop=face",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub dashboard: DashboardConfig,
    pub crash_log: CrashLogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub profiles_table: String,
    pub resumes_table: String,
    /// Column of `resumes_table` holding the owning profile id.
    pub owner_column: String,
    pub baseline: DashboardStats,
    pub avatars: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            profiles_table: "profiles".to_string(),
            resumes_table: "resumes".to_string(),
            owner_column: "user_id".to_string(),
            baseline: DashboardStats::default(),
            avatars: DEFAULT_AVATARS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashLogConfig {
    pub capacity: usize,
}

impl Default for CrashLogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CRASH_LOG_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Parse a JSON document; missing sections and fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RESUME_BACKEND_URL`, `RESUME_BACKEND_ANON_KEY` and
    /// `RESUME_CRASH_LOG_CAPACITY` from the process environment.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(url) = lookup("RESUME_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(key) = lookup("RESUME_BACKEND_ANON_KEY") {
            self.backend.anon_key = key;
        }
        if let Some(raw) = lookup("RESUME_CRASH_LOG_CAPACITY") {
            self.crash_log.capacity = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "crash_log.capacity",
                message: format!("not a number: {raw}"),
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "backend.base_url",
                message: "must not be empty".to_string(),
            });
        }
        if self.dashboard.avatars.is_empty() {
            return Err(ConfigError::Invalid {
                field: "dashboard.avatars",
                message: "at least one avatar URL is required".to_string(),
            });
        }
        if self.crash_log.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "crash_log.capacity",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
