//! Engine configuration with environment overrides.

use crate::error::ImesyncError;
use crate::platform::{Browser, OperatingSystem, Platform};
use std::env;

/// Environment variable overriding the operating system.
pub const ENV_OS: &str = "IMESYNC_OS";
/// Environment variable overriding the browser.
pub const ENV_BROWSER: &str = "IMESYNC_BROWSER";
/// Environment flag enabling per-event debug logging.
pub const ENV_TRACE_EVENTS: &str = "IMESYNC_TRACE_EVENTS";

/// Runtime configuration for one reconciliation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub platform: Platform,
    /// Log every processed event and its emitted intents at debug level.
    pub trace_events: bool,
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl EngineConfig {
    /// Configuration for `platform` with defaults for everything else.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables on top of `base`.
    ///
    /// # Returns
    /// `base` with any set `IMESYNC_*` variables applied.
    ///
    /// # Errors
    /// Returns an error when a variable is set to an unrecognized value.
    pub fn from_env_with(base: Self) -> Result<Self, ImesyncError> {
        let mut config = base;
        if let Some(os) = non_blank_var(ENV_OS) {
            config.platform.os = os.parse::<OperatingSystem>()?;
        }
        if let Some(browser) = non_blank_var(ENV_BROWSER) {
            config.platform.browser = browser.parse::<Browser>()?;
        }
        if let Ok(raw) = env::var(ENV_TRACE_EVENTS) {
            config.trace_events =
                parse_env_flag(&raw).ok_or(ImesyncError::InvalidConfig {
                    name: ENV_TRACE_EVENTS,
                    value: raw,
                })?;
        }
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Result<Self, ImesyncError> {
        Self::from_env_with(Self::default())
    }
}
