//! Shared test-only helpers for imesync_core.

use crate::diagnostics::Diagnostic;
use std::sync::{Arc, Mutex, Once, OnceLock};

/// Process-wide lock serializing environment mutation across test threads.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_env(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock` while mutating the environment.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Restores an environment variable value on drop.
pub(crate) struct EnvGuard {
    key: &'static str,
    previous: Option<String>,
}

impl EnvGuard {
    /// Set `key=value` for the lifetime of the guard.
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        write_env(key, Some(value));
        Self { key, previous }
    }

    /// Remove `key` for the lifetime of the guard.
    pub(crate) fn remove(key: &'static str) -> Self {
        let previous = std::env::var(key).ok();
        write_env(key, None);
        Self { key, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_env(self.key, self.previous.as_deref());
    }
}

/// Install a test-writer tracing subscriber once per process.
///
/// Honors `RUST_LOG`; silent by default.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Diagnostic sink that keeps everything it receives.
///
/// # Returns
/// The sink closure and a shared handle to the collected diagnostics.
pub(crate) fn collecting_sink() -> (
    impl FnMut(Diagnostic) + Send + 'static,
    Arc<Mutex<Vec<Diagnostic>>>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&seen);
    let sink = move |diagnostic: Diagnostic| {
        captured.lock().expect("diagnostic lock").push(diagnostic);
    };
    (sink, seen)
}
