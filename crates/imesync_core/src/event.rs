//! Canonical input events fed into the reconciliation engine.

use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// Key code browsers report for keys consumed by an IME.
pub const KEY_IN_COMPOSITION: u32 = 229;

/// Modifier keys held during a key event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

/// Payload of a key event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key: String,
    pub code: String,
    pub key_code: u32,
    pub is_composing: bool,
    pub repeat: bool,
    pub modifiers: Modifiers,
}

impl KeyInfo {
    /// True when the IME swallowed this key press.
    pub fn is_in_composition(&self) -> bool {
        self.key_code == KEY_IN_COMPOSITION
    }

    /// True for the horizontal arrow keys.
    pub fn is_horizontal_arrow(&self) -> bool {
        matches!(self.code.as_str(), "ArrowLeft" | "ArrowRight")
    }
}

/// Normalized raw event, carrying the surface state observed after it fired.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CanonicalEvent {
    KeyDown {
        key: KeyInfo,
        snapshot: Snapshot,
    },
    KeyUp {
        key: KeyInfo,
        snapshot: Snapshot,
    },
    CompositionStart {
        data: String,
        snapshot: Snapshot,
    },
    CompositionUpdate {
        data: String,
        snapshot: Snapshot,
    },
    CompositionEnd {
        data: String,
        snapshot: Snapshot,
    },
    BeforeInput {
        data: Option<String>,
        input_type: Option<String>,
        is_composing: bool,
        snapshot: Snapshot,
    },
    Input {
        data: Option<String>,
        input_type: Option<String>,
        is_composing: bool,
        snapshot: Snapshot,
    },
    /// Event kind the host forwarded but the engine has no handling for.
    Unrecognized { kind: String, snapshot: Snapshot },
}

impl CanonicalEvent {
    /// Surface state after the event.
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            Self::KeyDown { snapshot, .. }
            | Self::KeyUp { snapshot, .. }
            | Self::CompositionStart { snapshot, .. }
            | Self::CompositionUpdate { snapshot, .. }
            | Self::CompositionEnd { snapshot, .. }
            | Self::BeforeInput { snapshot, .. }
            | Self::Input { snapshot, .. }
            | Self::Unrecognized { snapshot, .. } => snapshot,
        }
    }

    /// Text payload for composition and input events.
    pub fn data(&self) -> Option<&str> {
        match self {
            Self::CompositionStart { data, .. }
            | Self::CompositionUpdate { data, .. }
            | Self::CompositionEnd { data, .. } => Some(data.as_str()),
            Self::BeforeInput { data, .. } | Self::Input { data, .. } => data.as_deref(),
            _ => None,
        }
    }

    /// DOM-style name of the event kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::KeyDown { .. } => "keydown",
            Self::KeyUp { .. } => "keyup",
            Self::CompositionStart { .. } => "compositionstart",
            Self::CompositionUpdate { .. } => "compositionupdate",
            Self::CompositionEnd { .. } => "compositionend",
            Self::BeforeInput { .. } => "beforeinput",
            Self::Input { .. } => "input",
            Self::Unrecognized { kind, .. } => kind.as_str(),
        }
    }
}
