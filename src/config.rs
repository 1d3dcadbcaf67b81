// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engine configuration loaded from environment variables.

use chrono::TimeDelta;
use std::env;

/// Default clustering threshold between consecutive start times.
pub const DEFAULT_GROUP_THRESHOLD_SECS: i64 = 180;

/// Default upper bound on segments accepted when building a multipart activity.
pub const DEFAULT_MAX_MULTIPART_SEGMENTS: usize = 4;

/// Engine configuration, loaded once by the composing component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum start time distance between consecutive activities of one group
    pub group_threshold: TimeDelta,
    /// Timezone name used when merged activities disagree on their timezone
    pub local_timezone: String,
    /// Maximum number of segments for a multipart activity
    pub max_multipart_segments: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group_threshold: TimeDelta::seconds(DEFAULT_GROUP_THRESHOLD_SECS),
            local_timezone: "UTC".to_string(),
            max_multipart_segments: DEFAULT_MAX_MULTIPART_SEGMENTS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting is optional; unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let threshold_secs = match env::var("GROUP_THRESHOLD_SECS") {
            Ok(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("GROUP_THRESHOLD_SECS", v))?,
            Err(_) => DEFAULT_GROUP_THRESHOLD_SECS,
        };

        let max_multipart_segments = match env::var("MAX_MULTIPART_SEGMENTS") {
            Ok(v) => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 1)
                .ok_or(ConfigError::Invalid("MAX_MULTIPART_SEGMENTS", v))?,
            Err(_) => DEFAULT_MAX_MULTIPART_SEGMENTS,
        };

        let local_timezone = env::var("LOCAL_TIMEZONE")
            .or_else(|_| env::var("TZ"))
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "UTC".to_string());

        Ok(Self {
            group_threshold: TimeDelta::seconds(threshold_secs),
            local_timezone,
            max_multipart_segments,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("GROUP_THRESHOLD_SECS", "240");
        env::set_var("LOCAL_TIMEZONE", "Europe/Berlin");
        env::remove_var("MAX_MULTIPART_SEGMENTS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.group_threshold, TimeDelta::seconds(240));
        assert_eq!(config.local_timezone, "Europe/Berlin");
        assert_eq!(config.max_multipart_segments, DEFAULT_MAX_MULTIPART_SEGMENTS);

        env::set_var("GROUP_THRESHOLD_SECS", "soon");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("GROUP_THRESHOLD_SECS", _))
        ));

        env::remove_var("GROUP_THRESHOLD_SECS");
        env::remove_var("LOCAL_TIMEZONE");
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(Config::default().group_threshold, TimeDelta::seconds(180));
    }
}
