//! Recorded browser interactions.
//!
//! A recording holds the surface state after every raw DOM event, exactly as
//! a capture page sees it, plus the state the document should end in. Field
//! names follow the DOM (`timeStamp`, `keyCode`, `inputType`, ...).

use crate::config::EngineConfig;
use crate::engine::ReconciliationEngine;
use crate::error::ImesyncError;
use crate::event::{CanonicalEvent, KeyInfo, Modifiers};
use crate::intent::{apply_all, EditIntent};
use crate::platform::{Browser, OperatingSystem, Platform};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment a session was recorded in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEnv {
    pub os: OperatingSystem,
    pub browser: Browser,
}

impl From<RecordedEnv> for Platform {
    fn from(env: RecordedEnv) -> Self {
        Platform::new(env.os, env.browser)
    }
}

/// One raw DOM event with the surface state observed after it.
///
/// Keyboard, composition and input events share one flat record; fields a
/// kind does not carry are left at their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    #[serde(default)]
    pub time_stamp: f64,
    pub state: Snapshot,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub is_composing: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub key_code: u32,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
}

impl RecordedEvent {
    fn key_info(&self) -> KeyInfo {
        KeyInfo {
            key: self.key.clone(),
            code: self.code.clone(),
            key_code: self.key_code,
            is_composing: self.is_composing,
            repeat: self.repeat,
            modifiers: Modifiers {
                alt: self.alt_key,
                ctrl: self.ctrl_key,
                meta: self.meta_key,
                shift: self.shift_key,
            },
        }
    }

    /// Normalize into the engine's event type.
    ///
    /// Kinds without handling (`keypress`, clipboard events, ...) become
    /// [`CanonicalEvent::Unrecognized`].
    pub fn to_canonical(&self) -> CanonicalEvent {
        let snapshot = self.state.clone();
        let data = self.data.clone().unwrap_or_default();
        match self.kind.as_str() {
            "keydown" => CanonicalEvent::KeyDown {
                key: self.key_info(),
                snapshot,
            },
            "keyup" => CanonicalEvent::KeyUp {
                key: self.key_info(),
                snapshot,
            },
            "compositionstart" => CanonicalEvent::CompositionStart { data, snapshot },
            "compositionupdate" => CanonicalEvent::CompositionUpdate { data, snapshot },
            "compositionend" => CanonicalEvent::CompositionEnd { data, snapshot },
            "beforeinput" => CanonicalEvent::BeforeInput {
                data: self.data.clone(),
                input_type: self.input_type.clone(),
                is_composing: self.is_composing,
                snapshot,
            },
            "input" => CanonicalEvent::Input {
                data: self.data.clone(),
                input_type: self.input_type.clone(),
                is_composing: self.is_composing,
                snapshot,
            },
            other => CanonicalEvent::Unrecognized {
                kind: other.to_string(),
                snapshot,
            },
        }
    }
}

/// A recorded interaction and the state the document must end in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    pub env: RecordedEnv,
    pub initial: Snapshot,
    pub events: Vec<RecordedEvent>,
    #[serde(rename = "final")]
    pub final_state: Snapshot,
    /// Intent sequence the recording is known to produce, when captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Vec<EditIntent>>,
}

impl RecordedSession {
    /// Parse a recording from JSON.
    ///
    /// # Errors
    /// Returns [`ImesyncError::RecordedSession`] for malformed JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ImesyncError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse a recording file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a recording.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImesyncError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Platform the session was recorded on.
    ///
    /// # Returns
    /// The recorded OS and browser as a [`Platform`].
    pub fn platform(&self) -> Platform {
        self.env.into()
    }

    /// Recorded events normalized for the engine, in recorded order.
    ///
    /// # Returns
    /// A lazy iterator; events are converted as they are consumed.
    pub fn canonical_events(&self) -> impl Iterator<Item = CanonicalEvent> + '_ {
        self.events.iter().map(RecordedEvent::to_canonical)
    }

    /// Replay through a fresh engine for the recorded platform.
    pub fn replay(&self) -> Vec<EditIntent> {
        let config = EngineConfig::for_platform(self.platform());
        let mut engine = ReconciliationEngine::new(self.initial.clone(), config);
        self.replay_into(&mut engine)
    }

    /// Replay through a caller-built engine.
    ///
    /// # Arguments
    /// - `engine`: Engine holding [`Self::initial`], possibly with a custom
    ///   platform or diagnostic sink.
    ///
    /// # Returns
    /// Every intent the engine emitted, in order.
    pub fn replay_into(&self, engine: &mut ReconciliationEngine) -> Vec<EditIntent> {
        self.canonical_events()
            .flat_map(|event| engine.process(&event))
            .collect()
    }

    /// Document state after applying `intents` to the initial snapshot.
    pub fn resulting_state(&self, intents: &[EditIntent]) -> Snapshot {
        apply_all(&self.initial, intents)
    }
}
