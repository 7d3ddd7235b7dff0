//! Platform identification and per-platform event quirks.
//!
//! Hosts disagree about which raw event carries the authoritative content
//! change. The quirk table is selected once per engine so the diff and session
//! logic stays platform-agnostic. Only the Chromium-on-macOS row is backed by
//! recorded interactions; the other rows follow the same shape and should be
//! re-checked against recordings before being relied on.

use crate::error::ImesyncError;
use crate::event::CanonicalEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system hosting the text-entry surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    Macintosh,
    #[default]
    Linux,
    Android,
}

/// Browser engine hosting the text-entry surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Edge,
    Firefox,
    Safari,
    Other,
}

impl FromStr for OperatingSystem {
    type Err = ImesyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" | "win32" => Ok(Self::Windows),
            "macintosh" | "macos" | "mac" | "darwin" => Ok(Self::Macintosh),
            "linux" => Ok(Self::Linux),
            "android" => Ok(Self::Android),
            _ => Err(ImesyncError::UnknownOperatingSystem(value.to_string())),
        }
    }
}

impl FromStr for Browser {
    type Err = ImesyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "edge" => Ok(Self::Edge),
            "firefox" => Ok(Self::Firefox),
            "safari" | "webkit" => Ok(Self::Safari),
            "other" => Ok(Self::Other),
            _ => Err(ImesyncError::UnknownBrowser(value.to_string())),
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "windows",
            Self::Macintosh => "macintosh",
            Self::Linux => "linux",
            Self::Android => "android",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chrome => "chrome",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// (OS, browser) pair an engine instance is bound to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: OperatingSystem,
    pub browser: Browser,
}

impl Platform {
    /// Pair an operating system with a browser.
    ///
    /// # Arguments
    /// - `os`: Operating system hosting the surface.
    /// - `browser`: Browser engine hosting the surface.
    pub fn new(os: OperatingSystem, browser: Browser) -> Self {
        Self { os, browser }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.browser)
    }
}

impl FromStr for Platform {
    type Err = ImesyncError;

    /// Parses `os/browser`, e.g. `macos/chrome`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (os, browser) =
            value
                .split_once('/')
                .ok_or_else(|| ImesyncError::InvalidConfig {
                    name: "platform",
                    value: value.to_string(),
                })?;
        Ok(Self::new(os.parse()?, browser.parse()?))
    }
}

/// Whether an input event kind drives diffing on a platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputRole {
    Authoritative,
    Advisory,
}

/// Per-platform event handling decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuirkTable {
    pub before_input: InputRole,
    pub input: InputRole,
    /// Composition events carry the staged text (otherwise the surface value
    /// is diffed instead).
    pub composition_data_usable: bool,
    /// Long-pressing a key and picking an accent with the arrow keys starts a
    /// composition over the already-typed character.
    pub long_press_accent: bool,
}

impl QuirkTable {
    /// Select the quirk table for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        let mac = platform.os == OperatingSystem::Macintosh;
        if platform.os == OperatingSystem::Android {
            // Android composition data does not say where the edit began.
            return Self {
                before_input: InputRole::Advisory,
                input: InputRole::Authoritative,
                composition_data_usable: false,
                long_press_accent: false,
            };
        }
        match platform.browser {
            Browser::Chrome | Browser::Edge | Browser::Safari => Self {
                before_input: InputRole::Advisory,
                input: InputRole::Authoritative,
                composition_data_usable: true,
                long_press_accent: mac,
            },
            Browser::Firefox => Self {
                before_input: InputRole::Advisory,
                input: InputRole::Authoritative,
                composition_data_usable: true,
                long_press_accent: false,
            },
            Browser::Other => Self {
                before_input: InputRole::Authoritative,
                input: InputRole::Authoritative,
                composition_data_usable: true,
                long_press_accent: false,
            },
        }
    }
}

/// How the engine treats one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// Diff the held snapshot against the event snapshot.
    Authoritative,
    /// Carries no content change for this platform.
    Advisory,
    /// Key press; advisory but remembered for composition heuristics.
    KeyDown,
    CompositionStart,
    CompositionUpdate,
    CompositionEnd,
    /// Unknown to the engine; dropped with a diagnostic.
    Unsupported,
}

/// Classifies canonical events using the quirk table of one platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventNormalizer {
    platform: Platform,
    quirks: QuirkTable,
}

impl EventNormalizer {
    /// Build a normalizer bound to `platform`.
    ///
    /// # Arguments
    /// - `platform`: Platform whose quirk table drives classification.
    ///
    /// # Returns
    /// A normalizer holding the quirk table selected for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            quirks: QuirkTable::for_platform(platform),
        }
    }

    /// Platform this normalizer was built for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Quirk table selected for [`Self::platform`].
    pub fn quirks(&self) -> &QuirkTable {
        &self.quirks
    }

    /// Decide how `event` is handled on this platform.
    ///
    /// # Arguments
    /// - `event`: Event to classify.
    /// - `composing`: Whether a composition session is active.
    ///
    /// # Returns
    /// The handling class. While a composition is staged from event data,
    /// `beforeinput` is advisory on every platform: it reports the surface
    /// before the IME replaces its selected candidate text.
    pub fn classify(&self, event: &CanonicalEvent, composing: bool) -> EventClass {
        let role = |role: InputRole| match role {
            InputRole::Authoritative => EventClass::Authoritative,
            InputRole::Advisory => EventClass::Advisory,
        };
        match event {
            CanonicalEvent::KeyDown { .. } => EventClass::KeyDown,
            CanonicalEvent::KeyUp { .. } => EventClass::Advisory,
            CanonicalEvent::CompositionStart { .. } => EventClass::CompositionStart,
            CanonicalEvent::CompositionUpdate { .. } => EventClass::CompositionUpdate,
            CanonicalEvent::CompositionEnd { .. } => EventClass::CompositionEnd,
            CanonicalEvent::BeforeInput { .. }
                if composing && self.quirks.composition_data_usable =>
            {
                EventClass::Advisory
            }
            CanonicalEvent::BeforeInput { .. } => role(self.quirks.before_input),
            CanonicalEvent::Input { .. } => role(self.quirks.input),
            CanonicalEvent::Unrecognized { .. } => EventClass::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    fn input(before: bool) -> CanonicalEvent {
        let snapshot = Snapshot::collapsed("a", 1);
        if before {
            CanonicalEvent::BeforeInput {
                data: Some("a".to_string()),
                input_type: Some("insertText".to_string()),
                is_composing: false,
                snapshot,
            }
        } else {
            CanonicalEvent::Input {
                data: Some("a".to_string()),
                input_type: Some("insertText".to_string()),
                is_composing: false,
                snapshot,
            }
        }
    }

    #[test]
    fn chromium_defers_to_input() {
        let normalizer = EventNormalizer::new(Platform::new(
            OperatingSystem::Macintosh,
            Browser::Chrome,
        ));
        assert_eq!(normalizer.classify(&input(true), false), EventClass::Advisory);
        assert_eq!(
            normalizer.classify(&input(false), false),
            EventClass::Authoritative
        );
        assert!(normalizer.quirks().composition_data_usable);
        assert!(normalizer.quirks().long_press_accent);
    }

    #[test]
    fn long_press_quirk_is_mac_only() {
        let table =
            QuirkTable::for_platform(Platform::new(OperatingSystem::Windows, Browser::Chrome));
        assert!(!table.long_press_accent);
    }

    #[test]
    fn android_diffs_instead_of_trusting_composition_data() {
        let table =
            QuirkTable::for_platform(Platform::new(OperatingSystem::Android, Browser::Chrome));
        assert!(!table.composition_data_usable);
        assert_eq!(table.input, InputRole::Authoritative);
    }

    #[test]
    fn unknown_browsers_treat_both_input_kinds_as_authoritative() {
        let normalizer =
            EventNormalizer::new(Platform::new(OperatingSystem::Linux, Browser::Other));
        assert_eq!(
            normalizer.classify(&input(true), false),
            EventClass::Authoritative
        );
        assert_eq!(
            normalizer.classify(&input(false), false),
            EventClass::Authoritative
        );
    }

    #[test]
    fn before_input_is_advisory_while_composition_data_drives_edits() {
        let other = EventNormalizer::new(Platform::new(OperatingSystem::Windows, Browser::Other));
        assert_eq!(other.classify(&input(true), true), EventClass::Advisory);
        assert_eq!(other.classify(&input(false), true), EventClass::Authoritative);

        let android =
            EventNormalizer::new(Platform::new(OperatingSystem::Android, Browser::Other));
        assert_eq!(android.classify(&input(true), true), EventClass::Advisory);
        assert_eq!(android.classify(&input(false), true), EventClass::Authoritative);
    }

    #[test]
    fn unrecognized_events_are_unsupported() {
        let normalizer = EventNormalizer::new(Platform::default());
        let event = CanonicalEvent::Unrecognized {
            kind: "keypress".to_string(),
            snapshot: Snapshot::default(),
        };
        assert_eq!(normalizer.classify(&event, false), EventClass::Unsupported);
    }

    #[test]
    fn platform_parses_from_slash_pair() {
        let platform: Platform = "macOS/Chrome".parse().expect("platform");
        assert_eq!(
            platform,
            Platform::new(OperatingSystem::Macintosh, Browser::Chrome)
        );
        assert_eq!(platform.to_string(), "macintosh/chrome");
        assert!(matches!(
            "beos/chrome".parse::<Platform>(),
            Err(ImesyncError::UnknownOperatingSystem(_))
        ));
        assert!(matches!(
            "linux".parse::<Platform>(),
            Err(ImesyncError::InvalidConfig { .. })
        ));
    }
}
