use std::time::Duration;

use crate::error::SettingsError;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

const API_BASE_VAR: &str = "EVALGATE_API_BASE";
const TIMEOUT_VAR: &str = "EVALGATE_TIMEOUT_MS";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    /// Per-request timeout for test calls. `None` waits indefinitely.
    pub test_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            test_timeout: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(base) = lookup(API_BASE_VAR) {
            let base = base.trim();
            if base.is_empty() {
                return Err(SettingsError {
                    key: API_BASE_VAR,
                    reason: "must not be empty".to_string(),
                });
            }
            settings.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|e| SettingsError {
                key: TIMEOUT_VAR,
                reason: format!("{e}"),
            })?;
            settings.test_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        Ok(settings)
    }
}
