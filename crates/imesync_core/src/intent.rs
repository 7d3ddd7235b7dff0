//! Edit intents handed to the document model.

use crate::snapshot::{splice_utf16, utf16_len, Snapshot};
use serde::{Deserialize, Serialize};

/// Canonical edit produced by the reconciliation engine.
///
/// Counts and deltas are UTF-16 code units relative to the selection of the
/// state the intent is applied to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditIntent {
    /// Replace `replace_prev_char_cnt` units before the selection, the
    /// selection itself and `replace_next_char_cnt` units after it with
    /// `text`, then shift the collapsed caret by `position_delta`.
    #[serde(rename_all = "camelCase")]
    Type {
        text: String,
        replace_prev_char_cnt: usize,
        replace_next_char_cnt: usize,
        position_delta: i64,
    },
    #[serde(rename_all = "camelCase")]
    CompositionStart { reveal_delta_columns: i64 },
    CompositionUpdate { data: String },
    CompositionEnd,
}

impl EditIntent {
    /// Shorthand for a [`EditIntent::Type`].
    pub fn typed(
        text: impl Into<String>,
        replace_prev_char_cnt: usize,
        replace_next_char_cnt: usize,
        position_delta: i64,
    ) -> Self {
        Self::Type {
            text: text.into(),
            replace_prev_char_cnt,
            replace_next_char_cnt,
            position_delta,
        }
    }

    /// True for a `Type` that would not change anything.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::Type {
                text,
                replace_prev_char_cnt: 0,
                replace_next_char_cnt: 0,
                position_delta: 0,
            } if text.is_empty()
        )
    }

    /// Apply this intent to `state`, returning the resulting snapshot.
    ///
    /// Lifecycle intents leave the state unchanged; `Type` collapses the
    /// selection at the resulting caret.
    pub fn apply(&self, state: &Snapshot) -> Snapshot {
        let Self::Type {
            text,
            replace_prev_char_cnt,
            replace_next_char_cnt,
            position_delta,
        } = self
        else {
            return state.clone();
        };
        let len = state.len_utf16();
        let start = state.selection_start.saturating_sub(*replace_prev_char_cnt);
        let end = state
            .selection_end
            .saturating_add(*replace_next_char_cnt)
            .min(len);
        let value = splice_utf16(&state.value, start..end, text);
        let caret = (start + utf16_len(text)) as i64 + position_delta;
        let new_len = utf16_len(&value) as i64;
        Snapshot::collapsed(value, caret.clamp(0, new_len) as usize)
    }
}

/// Apply `intents` in order starting from `initial`.
pub fn apply_all<'a>(
    initial: &Snapshot,
    intents: impl IntoIterator<Item = &'a EditIntent>,
) -> Snapshot {
    intents
        .into_iter()
        .fold(initial.clone(), |state, intent| intent.apply(&state))
}
