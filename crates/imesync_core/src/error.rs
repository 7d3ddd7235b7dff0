//! Error types for configuration and recorded-session loading.

use thiserror::Error;

/// Top-level error type.
///
/// Reconciliation itself never fails; these cover setup paths only.
#[derive(Error, Debug)]
pub enum ImesyncError {
    #[error("Unknown operating system: {0}")]
    UnknownOperatingSystem(String),

    #[error("Unknown browser: {0}")]
    UnknownBrowser(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },

    #[error("Recorded session parse error: {0}")]
    RecordedSession(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
