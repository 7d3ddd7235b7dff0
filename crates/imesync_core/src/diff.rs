//! Minimal edit between two snapshots.

use crate::intent::EditIntent;
use crate::snapshot::{is_high_surrogate, is_low_surrogate, utf16_units, Snapshot};

/// Replacement that turns one snapshot into another.
///
/// The replaced span is `[selection_start - deleted_before, selection_end +
/// deleted_after]` of the old snapshot, counted in UTF-16 code units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextEdit {
    pub deleted_before: usize,
    pub deleted_after: usize,
    pub inserted_text: String,
    pub position_delta: i64,
}

/// Result of [`diff_checked`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffOutcome {
    /// The trimmed edit reproduces the new snapshot.
    Trimmed(TextEdit),
    /// The trimmed edit did not reproduce the new snapshot; the whole value is
    /// replaced instead.
    FullReplace(TextEdit),
}

impl DiffOutcome {
    /// Returns the edit regardless of how it was produced.
    pub fn into_edit(self) -> TextEdit {
        match self {
            Self::Trimmed(edit) | Self::FullReplace(edit) => edit,
        }
    }
}

impl TextEdit {
    /// True when applying the edit would change nothing.
    pub fn is_empty(&self) -> bool {
        self.deleted_before == 0
            && self.deleted_after == 0
            && self.inserted_text.is_empty()
            && self.position_delta == 0
    }

    /// Replace everything in `old` with the value of `new`.
    pub fn full_replace(old: &Snapshot, new: &Snapshot) -> Self {
        let old_len = old.len_utf16();
        let new_len = new.len_utf16();
        Self {
            deleted_before: old.selection_start,
            deleted_after: old_len.saturating_sub(old.selection_end),
            inserted_text: new.value.clone(),
            position_delta: new.selection_start as i64 - new_len as i64,
        }
    }

    /// Converts the edit into a `Type` intent, or `None` when it is empty.
    pub fn into_intent(self) -> Option<EditIntent> {
        if self.is_empty() {
            return None;
        }
        Some(EditIntent::Type {
            text: self.inserted_text,
            replace_prev_char_cnt: self.deleted_before,
            replace_next_char_cnt: self.deleted_after,
            position_delta: self.position_delta,
        })
    }

    /// Apply the edit to `old`.
    pub fn apply(&self, old: &Snapshot) -> Snapshot {
        EditIntent::typed(
            self.inserted_text.clone(),
            self.deleted_before,
            self.deleted_after,
            self.position_delta,
        )
        .apply(old)
    }
}

fn common_prefix_len(a: &[u16], b: &[u16]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &[u16], b: &[u16]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Compute the edit turning `old` into `new`.
///
/// Prefix and suffix are compared per UTF-16 code unit; composed characters
/// are opaque. The replaced span always covers the old selection, and neither
/// end of it splits a surrogate pair.
pub fn diff(old: &Snapshot, new: &Snapshot) -> TextEdit {
    if old.value == new.value && old.selection() == new.selection() {
        return TextEdit::default();
    }
    let old_units = utf16_units(&old.value);
    let new_units = utf16_units(&new.value);
    let old_start = old.selection_start.min(old_units.len());
    let old_end = old.selection_end.clamp(old_start, old_units.len());

    let mut prefix = common_prefix_len(&old_units, &new_units).min(old_start);
    let mut suffix = common_suffix_len(&old_units, &new_units).min(old_units.len() - old_end);
    let limit = old_units.len().min(new_units.len());
    if prefix + suffix > limit {
        suffix = limit.saturating_sub(prefix);
    }
    if prefix > 0 && is_high_surrogate(old_units[prefix - 1]) {
        prefix -= 1;
    }
    if suffix > 0 && is_low_surrogate(old_units[old_units.len() - suffix]) {
        suffix -= 1;
    }

    let inserted = &new_units[prefix..new_units.len() - suffix];
    let position_delta = new.selection_start as i64 - (prefix + inserted.len()) as i64;
    TextEdit {
        deleted_before: old_start - prefix,
        deleted_after: (old_units.len() - suffix).saturating_sub(old_end),
        inserted_text: String::from_utf16_lossy(inserted),
        position_delta,
    }
}

/// Compute the edit and verify it reproduces `new`'s value and caret.
///
/// Falls back to [`TextEdit::full_replace`] when it does not; reconciliation
/// keeps going either way.
pub fn diff_checked(old: &Snapshot, new: &Snapshot) -> DiffOutcome {
    let edit = diff(old, new);
    let applied = edit.apply(old);
    if applied.value == new.value && applied.selection_start == new.selection_start {
        DiffOutcome::Trimmed(edit)
    } else {
        DiffOutcome::FullReplace(TextEdit::full_replace(old, new))
    }
}
