//! Replays recorded IME interactions through the engine.

use imesync_core::{
    Browser, Diagnostic, EditIntent, OperatingSystem, Platform, ReconciliationEngine,
    RecordedSession, Snapshot,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};
use tempfile::TempDir;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.json", name))
}

fn load(name: &str) -> RecordedSession {
    init_tracing();
    RecordedSession::from_path(fixture_path(name))
        .unwrap_or_else(|err| panic!("load fixture {}: {}", name, err))
}

fn typed(text: &str, prev: usize) -> EditIntent {
    EditIntent::typed(text, prev, 0, 0)
}

fn update(data: &str) -> EditIntent {
    EditIntent::CompositionUpdate {
        data: data.to_string(),
    }
}

const FIXTURES: [&str; 3] = ["korean_dkrk", "japanese_hiragana_sennsei", "chinese_pinyin_xu1"];

const START: EditIntent = EditIntent::CompositionStart {
    reveal_delta_columns: 0,
};

/// Replay `session`, check it against its recorded expectations and return
/// the emitted intents.
fn replay_and_check(session: &RecordedSession) -> Vec<EditIntent> {
    let intents = session.replay();
    if let Some(expected) = &session.expected {
        assert_eq!(&intents, expected);
    }
    assert_eq!(session.resulting_state(&intents), session.final_state);
    intents
}

#[test]
fn korean_two_set_composes_two_syllables() {
    let session = load("korean_dkrk");
    let intents = replay_and_check(&session);
    assert_eq!(
        intents,
        vec![
            START,
            typed("ㅇ", 0),
            update("ㅇ"),
            typed("아", 1),
            update("아"),
            typed("악", 1),
            update("악"),
            typed("아", 1),
            update("아"),
            typed("아", 1),
            EditIntent::CompositionEnd,
            START,
            typed("가", 0),
            update("가"),
            typed("가", 1),
            EditIntent::CompositionEnd,
        ]
    );
    assert_eq!(
        session.resulting_state(&intents),
        Snapshot::collapsed("aa아가aa", 4)
    );
}

#[test]
fn chinese_pinyin_commits_candidate() {
    let session = load("chinese_pinyin_xu1");
    let intents = replay_and_check(&session);
    assert_eq!(
        intents,
        vec![
            START,
            typed("x", 0),
            update("x"),
            typed("xu", 1),
            update("xu"),
            typed("需", 2),
            update("需"),
            typed("需", 1),
            EditIntent::CompositionEnd,
        ]
    );
    assert_eq!(
        session.resulting_state(&intents),
        Snapshot::collapsed("aa需aa", 3)
    );
}

#[test]
fn japanese_hiragana_repeats_unchanged_update() {
    let session = load("japanese_hiragana_sennsei");
    let intents = replay_and_check(&session);
    assert_eq!(intents.len(), 19);
    assert_eq!(
        &intents[intents.len() - 5..],
        &[
            update("せんせい"),
            typed("せんせい", 4),
            update("せんせい"),
            typed("せんせい", 4),
            EditIntent::CompositionEnd,
        ]
    );
    assert_eq!(
        session.resulting_state(&intents),
        Snapshot::collapsed("aaせんせいaa", 6)
    );
}

#[test]
fn recordings_only_report_routine_diagnostics() {
    for name in FIXTURES {
        let session = load(name);
        let seen = Arc::new(Mutex::new(Vec::<Diagnostic>::new()));
        let captured = Arc::clone(&seen);
        let mut engine = ReconciliationEngine::builder(session.initial.clone())
            .platform(session.platform())
            .trace_events(true)
            .diagnostics(move |diagnostic: Diagnostic| {
                captured.lock().expect("diagnostics").push(diagnostic);
            })
            .build();
        session.replay_into(&mut engine);
        assert!(!engine.is_composing(), "{} left a composition open", name);
        assert_eq!(engine.snapshot(), &session.final_state);
        let seen = seen.lock().expect("diagnostics");
        assert!(
            seen.iter().all(Diagnostic::is_routine),
            "{}: unexpected diagnostics {:?}",
            name,
            *seen
        );
    }
}

#[test]
fn recordings_load_from_any_path() {
    let dir = TempDir::new().expect("temp dir");
    let copy = dir.path().join("session.json");
    std::fs::copy(fixture_path("chinese_pinyin_xu1"), &copy).expect("copy fixture");
    let session = RecordedSession::from_path(&copy).expect("load copy");
    assert_eq!(
        session.platform(),
        Platform::new(OperatingSystem::Macintosh, Browser::Chrome)
    );
    assert_eq!(session.replay().len(), 9);

    let missing = RecordedSession::from_path(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(imesync_core::ImesyncError::Io(_))));
}

#[test]
fn recording_without_composition_data_still_converges() {
    let mut session = load("korean_dkrk");
    session.env.os = OperatingSystem::Android;
    session.expected = None;
    let intents = session.replay();
    assert_eq!(
        intents
            .iter()
            .filter(|intent| matches!(intent, EditIntent::CompositionEnd))
            .count(),
        2
    );
    assert_eq!(session.resulting_state(&intents), session.final_state);
}

#[test]
fn recordings_replay_identically_on_every_desktop_quirk_row() {
    let systems = [
        OperatingSystem::Macintosh,
        OperatingSystem::Windows,
        OperatingSystem::Linux,
    ];
    let browsers = [
        Browser::Chrome,
        Browser::Edge,
        Browser::Firefox,
        Browser::Safari,
        Browser::Other,
    ];
    for name in FIXTURES {
        let recorded = load(name);
        let expected = recorded.expected.clone().expect("fixture carries intents");
        for os in systems {
            for browser in browsers {
                let platform = Platform::new(os, browser);
                let mut session = recorded.clone();
                session.env.os = os;
                session.env.browser = browser;

                let seen = Arc::new(Mutex::new(Vec::<Diagnostic>::new()));
                let captured = Arc::clone(&seen);
                let mut engine = ReconciliationEngine::builder(session.initial.clone())
                    .platform(platform)
                    .diagnostics(move |diagnostic: Diagnostic| {
                        captured.lock().expect("diagnostics").push(diagnostic);
                    })
                    .build();
                let intents = session.replay_into(&mut engine);

                assert_eq!(intents, expected, "{} on {}", name, platform);
                assert_eq!(
                    session.resulting_state(&intents),
                    session.final_state,
                    "{} on {}",
                    name,
                    platform
                );
                let seen = seen.lock().expect("diagnostics");
                assert!(
                    seen.iter().all(Diagnostic::is_routine),
                    "{} on {}: unexpected diagnostics {:?}",
                    name,
                    platform,
                    *seen
                );
            }
        }
    }
}
