//! Reconciliation engine: canonical events in, edit intents out.
//!
//! The engine owns the held snapshot (its model of what the document already
//! contains) and the composition session. Both are replaced wholesale after
//! each event so diffs always compare two complete states.

use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::diff::{diff_checked, DiffOutcome};
use crate::event::{CanonicalEvent, KeyInfo};
use crate::intent::EditIntent;
use crate::platform::{EventClass, EventNormalizer, Platform};
use crate::session::{self, CompositionSession, SessionTracker};
use crate::snapshot::Snapshot;
use std::fmt;
use tracing::debug;

/// Builder for [`ReconciliationEngine`].
pub struct EngineBuilder {
    initial: Snapshot,
    config: EngineConfig,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
}

impl EngineBuilder {
    /// Replace the whole configuration.
    ///
    /// # Arguments
    /// - `config`: Platform and tracing settings, e.g. from
    ///   [`EngineConfig::from_env`].
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind the engine to `platform`, selecting its quirk table.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = platform;
        self
    }

    /// Log every processed event and its intents at debug level.
    pub fn trace_events(mut self, enabled: bool) -> Self {
        self.config.trace_events = enabled;
        self
    }

    /// Route diagnostics to `sink` instead of `tracing`.
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Some(Box::new(sink));
        self
    }

    /// Finish the engine.
    ///
    /// # Returns
    /// An idle engine holding the sanitized initial snapshot. A clamped
    /// initial selection is reported to the configured sink.
    pub fn build(self) -> ReconciliationEngine {
        let mut engine = ReconciliationEngine {
            snapshot: Snapshot::default(),
            sessions: SessionTracker::default(),
            normalizer: EventNormalizer::new(self.config.platform),
            last_key_down: None,
            trace_events: self.config.trace_events,
            diagnostics: self
                .diagnostics
                .unwrap_or_else(|| Box::new(TracingSink)),
        };
        engine.snapshot = engine.accept_snapshot(&self.initial);
        engine
    }
}

/// Converts one text-entry surface's event stream into edit intents.
///
/// Calls must be serialized; `process` takes `&mut self` so a second call can
/// not start before the first returns.
pub struct ReconciliationEngine {
    snapshot: Snapshot,
    sessions: SessionTracker,
    normalizer: EventNormalizer,
    last_key_down: Option<KeyInfo>,
    trace_events: bool,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("snapshot", &self.snapshot)
            .field("sessions", &self.sessions)
            .field("platform", &self.normalizer.platform())
            .finish_non_exhaustive()
    }
}

impl ReconciliationEngine {
    /// Create an engine holding `initial`.
    pub fn new(initial: Snapshot, config: EngineConfig) -> Self {
        Self::builder(initial).config(config).build()
    }

    /// Start building an engine holding `initial`.
    ///
    /// # Returns
    /// A builder with the default platform, tracing disabled and diagnostics
    /// routed to [`TracingSink`].
    pub fn builder(initial: Snapshot) -> EngineBuilder {
        EngineBuilder {
            initial,
            config: EngineConfig::default(),
            diagnostics: None,
        }
    }

    /// Snapshot the engine believes the document currently reflects.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Active composition, if any.
    pub fn composition(&self) -> Option<&CompositionSession> {
        self.sessions.session()
    }

    /// True while an IME composition is active.
    pub fn is_composing(&self) -> bool {
        self.sessions.is_composing()
    }

    /// Platform the engine was built for.
    pub fn platform(&self) -> Platform {
        self.normalizer.platform()
    }

    /// Re-sync after the host changed the surface programmatically.
    ///
    /// An active composition is abandoned and closed with `CompositionEnd`.
    pub fn reset(&mut self, snapshot: Snapshot) -> Vec<EditIntent> {
        let mut out = Vec::new();
        if self.sessions.finish().is_some() {
            out.push(EditIntent::CompositionEnd);
        }
        self.snapshot = self.accept_snapshot(&snapshot);
        self.last_key_down = None;
        out
    }

    /// Process one event, returning the intents it produced (at most two).
    pub fn process(&mut self, event: &CanonicalEvent) -> Vec<EditIntent> {
        let observed = self.accept_snapshot(event.snapshot());
        let class = self.normalizer.classify(event, self.is_composing());
        let data = event.data().unwrap_or_default();
        let mut out = Vec::with_capacity(2);
        match class {
            EventClass::Advisory => {}
            EventClass::KeyDown => {
                if let CanonicalEvent::KeyDown { key, .. } = event {
                    self.last_key_down = Some(key.clone());
                }
            }
            EventClass::Unsupported => self.report(Diagnostic::UnsupportedEvent {
                kind: event.kind().to_string(),
                platform: self.platform(),
            }),
            EventClass::CompositionStart => self.start_composition(data, &mut out),
            EventClass::CompositionUpdate => self.update_composition(data, &mut out),
            EventClass::CompositionEnd => self.end_composition(data, observed, &mut out),
            EventClass::Authoritative => self.reconcile(observed, &mut out),
        }
        if self.trace_events {
            debug!(
                event = event.kind(),
                ?class,
                composing = self.is_composing(),
                intents = ?out,
                "processed text input event"
            );
        }
        out
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    fn accept_snapshot(&mut self, raw: &Snapshot) -> Snapshot {
        let (fixed, clamped) = raw.sanitized();
        if clamped {
            self.report(Diagnostic::SelectionClamped {
                start: raw.selection_start,
                end: raw.selection_end,
                fixed_start: fixed.selection_start,
                fixed_end: fixed.selection_end,
            });
        }
        fixed
    }

    /// Text the IME is about to recompose after a long-press accent pick.
    fn long_press_seed(&self, data: &str) -> Option<String> {
        if !self.normalizer.quirks().long_press_accent {
            return None;
        }
        let key = self.last_key_down.as_ref()?;
        if !key.is_in_composition() || !key.is_horizontal_arrow() {
            return None;
        }
        let before = self.snapshot.scalar_before_caret()?;
        (before == data).then_some(before)
    }

    fn start_composition(&mut self, data: &str, out: &mut Vec<EditIntent>) {
        let (reveal, seed) = match self.long_press_seed(data) {
            Some(seed) => (-1, seed),
            None => (0, String::new()),
        };
        if let Some(abandoned) = self.sessions.begin(self.snapshot.clone(), reveal, seed) {
            self.report(Diagnostic::CompositionRestarted {
                abandoned: abandoned.last_data().to_string(),
            });
            out.push(EditIntent::CompositionEnd);
        }
        out.push(EditIntent::CompositionStart {
            reveal_delta_columns: reveal,
        });
    }

    fn update_composition(&mut self, data: &str, out: &mut Vec<EditIntent>) {
        if !self.sessions.is_composing() {
            self.report(Diagnostic::UnexpectedCompositionEvent {
                kind: "compositionupdate",
            });
            return;
        }
        // Some hosts fire this before the surface value changes, so the
        // staged text comes from the event data rather than a diff.
        if self.normalizer.quirks().composition_data_usable {
            if let Some(intent) = self.sessions.stage(data) {
                self.emit_type(intent, out);
            }
        }
        out.push(EditIntent::CompositionUpdate {
            data: data.to_string(),
        });
    }

    fn end_composition(&mut self, data: &str, observed: Snapshot, out: &mut Vec<EditIntent>) {
        let Some(finished) = self.sessions.finish() else {
            self.report(Diagnostic::UnexpectedCompositionEvent {
                kind: "compositionend",
            });
            return;
        };
        if self.normalizer.quirks().composition_data_usable {
            self.emit_type(session::commit(finished, data), out);
        } else {
            self.reconcile(observed, out);
        }
        out.push(EditIntent::CompositionEnd);
    }

    /// Emit a `Type` derived from composition data and fold it into the
    /// held snapshot, so the matching authoritative event diffs to nothing.
    fn emit_type(&mut self, intent: EditIntent, out: &mut Vec<EditIntent>) {
        if intent.is_noop() {
            return;
        }
        self.snapshot = intent.apply(&self.snapshot);
        self.sessions.observe(&self.snapshot);
        out.push(intent);
    }

    fn reconcile(&mut self, observed: Snapshot, out: &mut Vec<EditIntent>) {
        let outcome = diff_checked(&self.snapshot, &observed);
        if let DiffOutcome::FullReplace(_) = outcome {
            self.report(Diagnostic::FullReplaceFallback {
                old_len: self.snapshot.len_utf16(),
                new_len: observed.len_utf16(),
            });
        }
        if let Some(intent) = outcome.into_edit().into_intent() {
            out.push(intent);
        }
        self.sessions.observe(&observed);
        self.snapshot = observed;
    }
}
