//! Immutable text value + selection records used as the diff unit.
//!
//! Offsets are UTF-16 code units because that is what DOM text-entry surfaces
//! report. Helpers in this module keep every offset on a scalar boundary so
//! slices can always be turned back into a `String`.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Direction reported alongside a selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionDirection {
    Forward,
    Backward,
    #[default]
    None,
}

/// Text value and selection of a text-entry surface at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
    #[serde(default)]
    pub selection_direction: SelectionDirection,
}

impl Snapshot {
    /// Build a snapshot, clamping the selection into the value.
    pub fn new(value: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        let raw = Self {
            value: value.into(),
            selection_start,
            selection_end,
            selection_direction: SelectionDirection::None,
        };
        raw.sanitized().0
    }

    /// Build a snapshot with a collapsed selection at `caret`.
    pub fn collapsed(value: impl Into<String>, caret: usize) -> Self {
        Self::new(value, caret, caret)
    }

    /// Returns the value length in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        self.value.encode_utf16().count()
    }

    /// True when the selection is empty.
    pub fn is_collapsed(&self) -> bool {
        self.selection_start == self.selection_end
    }

    /// Returns the selection as a code-unit range.
    pub fn selection(&self) -> Range<usize> {
        self.selection_start..self.selection_end
    }

    /// Returns a copy whose selection satisfies `start <= end <= len`.
    ///
    /// Reversed bounds are swapped and marked backward, out-of-range bounds
    /// are clamped and offsets inside a surrogate pair move to the pair start.
    /// The flag is true when any bound had to change.
    pub fn sanitized(&self) -> (Self, bool) {
        let units = utf16_units(&self.value);
        let mut start = self.selection_start;
        let mut end = self.selection_end;
        let mut direction = self.selection_direction;
        if start > end {
            std::mem::swap(&mut start, &mut end);
            direction = SelectionDirection::Backward;
        }
        let start_fixed = floor_boundary(&units, start.min(units.len()));
        let end_fixed = floor_boundary(&units, end.min(units.len()));
        let changed = start_fixed != self.selection_start || end_fixed != self.selection_end;
        (
            Self {
                value: self.value.clone(),
                selection_start: start_fixed,
                selection_end: end_fixed,
                selection_direction: direction,
            },
            changed,
        )
    }

    /// Returns the text immediately before a collapsed caret (one scalar).
    pub(crate) fn scalar_before_caret(&self) -> Option<String> {
        if !self.is_collapsed() || self.selection_start == 0 {
            return None;
        }
        let units = utf16_units(&self.value);
        let end = self.selection_start.min(units.len());
        let mut start = end.saturating_sub(1);
        if start > 0 && is_low_surrogate(units[start]) && is_high_surrogate(units[start - 1]) {
            start -= 1;
        }
        Some(String::from_utf16_lossy(&units[start..end]))
    }
}

pub(crate) fn utf16_units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

pub(crate) fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Moves `index` back to the start of a surrogate pair it would split.
pub(crate) fn floor_boundary(units: &[u16], index: usize) -> usize {
    let index = index.min(units.len());
    if index > 0
        && index < units.len()
        && is_high_surrogate(units[index - 1])
        && is_low_surrogate(units[index])
    {
        index - 1
    } else {
        index
    }
}

/// Replace `range` (code units) of `value` with `insert`.
pub(crate) fn splice_utf16(value: &str, range: Range<usize>, insert: &str) -> String {
    let units = utf16_units(value);
    let start = floor_boundary(&units, range.start);
    let end = floor_boundary(&units, range.end.max(start));
    let mut out: Vec<u16> = Vec::with_capacity(units.len() + insert.len());
    out.extend_from_slice(&units[..start]);
    out.extend(insert.encode_utf16());
    out.extend_from_slice(&units[end..]);
    String::from_utf16_lossy(&out)
}
