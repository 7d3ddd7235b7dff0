//! Text-entry reconciliation core (snapshots, diffing, IME sessions).
//!
//! A host feeds [`CanonicalEvent`]s captured from a text-entry surface into a
//! [`ReconciliationEngine`] and applies the returned [`EditIntent`]s to its own
//! document model, in order, exactly once.

/// Engine configuration and environment overrides.
pub mod config;
/// Non-fatal anomaly reporting.
pub mod diagnostics;
/// Snapshot diffing.
pub mod diff;
/// Reconciliation engine.
pub mod engine;
/// Error types (configuration, recorded sessions).
pub mod error;
/// Canonical input events.
pub mod event;
/// Edit intents produced for the document model.
pub mod intent;
/// Platform identification and the per-platform quirk table.
pub mod platform;
/// Recorded browser interactions and replay helpers.
pub mod recorded;
/// IME composition session tracking.
pub mod session;
/// Text value + selection snapshots.
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::EngineConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
pub use diff::{diff, diff_checked, TextEdit};
pub use engine::{EngineBuilder, ReconciliationEngine};
pub use error::ImesyncError;
pub use event::{CanonicalEvent, KeyInfo, Modifiers};
pub use intent::EditIntent;
pub use platform::{Browser, EventClass, EventNormalizer, OperatingSystem, Platform, QuirkTable};
pub use recorded::RecordedSession;
pub use session::{CompositionSession, SessionTracker};
pub use snapshot::{SelectionDirection, Snapshot};
