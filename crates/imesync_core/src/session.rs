//! Composition session tracking (Idle / Composing).

use crate::intent::EditIntent;
use crate::snapshot::{utf16_len, Snapshot};

/// State of one in-progress IME composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositionSession {
    anchor: Snapshot,
    last_data: String,
    initial_reveal: i64,
    reveal_delta_columns: i64,
}

impl CompositionSession {
    fn new(anchor: Snapshot, initial_reveal: i64, seed: String) -> Self {
        Self {
            anchor,
            last_data: seed,
            initial_reveal,
            reveal_delta_columns: initial_reveal,
        }
    }

    /// Snapshot held when the composition started.
    pub fn anchor(&self) -> &Snapshot {
        &self.anchor
    }

    /// Staged text most recently announced by the IME.
    pub fn last_data(&self) -> &str {
        &self.last_data
    }

    /// Caret offset from the anchor caret, for IME popup placement.
    pub fn reveal_delta_columns(&self) -> i64 {
        self.reveal_delta_columns
    }

    /// Replace the staged text with `data`.
    ///
    /// The returned `Type` deletes exactly the previously staged text.
    fn stage(&mut self, data: &str) -> EditIntent {
        let intent = EditIntent::typed(data, utf16_len(&self.last_data), 0, 0);
        self.last_data = data.to_string();
        intent
    }

    fn observe(&mut self, snapshot: &Snapshot) {
        let moved = snapshot.selection_start as i64 - self.anchor.selection_start as i64;
        self.reveal_delta_columns = self.initial_reveal + moved;
    }
}

/// Finite state machine over {Idle, Composing}.
///
/// Idle is represented by the absence of a session; sessions are discarded on
/// end and never reused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionTracker {
    session: Option<CompositionSession>,
}

impl SessionTracker {
    /// True while a composition is active.
    pub fn is_composing(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the active session, if any.
    pub fn session(&self) -> Option<&CompositionSession> {
        self.session.as_ref()
    }

    /// Start a composition anchored at `anchor`.
    ///
    /// `seed` is text the IME is known to replace on its first update. Returns
    /// the session that was still active, if the IME restarted without ending.
    pub fn begin(
        &mut self,
        anchor: Snapshot,
        reveal_delta_columns: i64,
        seed: String,
    ) -> Option<CompositionSession> {
        self.session
            .replace(CompositionSession::new(anchor, reveal_delta_columns, seed))
    }

    /// Stage `data`, returning the `Type` that swaps it in. `None` when idle.
    pub fn stage(&mut self, data: &str) -> Option<EditIntent> {
        self.session.as_mut().map(|session| session.stage(data))
    }

    /// Recompute the reveal delta from an adopted snapshot.
    pub fn observe(&mut self, snapshot: &Snapshot) {
        if let Some(session) = self.session.as_mut() {
            session.observe(snapshot);
        }
    }

    /// End the composition, returning the finished session. `None` when idle.
    pub fn finish(&mut self) -> Option<CompositionSession> {
        self.session.take()
    }
}

/// Stage the final `data` of a finished session.
pub(crate) fn commit(mut session: CompositionSession, data: &str) -> EditIntent {
    session.stage(data)
}
