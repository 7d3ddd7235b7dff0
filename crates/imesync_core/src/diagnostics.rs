//! Non-fatal anomalies observed while reconciling.
//!
//! Nothing here ever interrupts typing: the engine recovers first and then
//! reports what it did to the injected [`DiagnosticSink`].

use crate::platform::Platform;
use thiserror::Error;

/// Anomaly the engine recovered from.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("selection {start}..{end} clamped to {fixed_start}..{fixed_end}")]
    SelectionClamped {
        start: usize,
        end: usize,
        fixed_start: usize,
        fixed_end: usize,
    },

    #[error("trimmed diff did not reproduce the surface state; replaced {old_len} units with {new_len}")]
    FullReplaceFallback { old_len: usize, new_len: usize },

    #[error("event `{kind}` is not handled on {platform}")]
    UnsupportedEvent { kind: String, platform: Platform },

    #[error("`{kind}` received without an active composition")]
    UnexpectedCompositionEvent { kind: &'static str },

    #[error("composition restarted before the previous one ended (staged `{abandoned}`)")]
    CompositionRestarted { abandoned: String },
}

impl Diagnostic {
    /// True for diagnostics that only describe expected host noise.
    pub fn is_routine(&self) -> bool {
        matches!(self, Self::UnsupportedEvent { .. })
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink: Send {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(Diagnostic) + Send,
{
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Default sink: forwards diagnostics to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_routine() {
            tracing::debug!(%diagnostic, "text input diagnostic");
        } else {
            tracing::warn!(%diagnostic, "text input diagnostic");
        }
    }
}
