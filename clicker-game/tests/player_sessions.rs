use clicker_game::{
    ClickerEngine, EngineError, FixedClock, FixedRoll, MemoryStore, PlayerIdentity, PlayerRecord,
    PlayerStore, SystemClock,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

const LEGACY_SAVE: &str = r#"{
    "1001": {
        "coins": 12500,
        "levels": [10, 4, 0, 0, 0, 0, 0],
        "current_char": 1,
        "earn_upgrade": 3,
        "latyao_until": 1700000123.75,
        "name": "Legacy Larry",
        "created_at": 1699990000.5,
        "last_daily": 0,
        "daily_streak": 2,
        "achievements": ["coins_1000", "first_max_char"]
    },
    "1002": {
        "coins": 40,
        "levels": [3],
        "name": "Short Roster"
    }
}"#;

#[test]
fn same_player_actions_never_lose_updates() {
    let engine = ClickerEngine::new(MemoryStore::new(), SystemClock, FixedRoll::never_crit());
    let identity = PlayerIdentity::new("race", "Racer");
    let threads: u64 = 8;
    let per_thread: u64 = 250;

    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                for _ in 0..per_thread {
                    engine.perform_action(&identity).unwrap();
                }
            });
        }
    });

    let record = engine.player("race").unwrap();
    // 2000 single-coin actions, plus the Fat Start reward picked up on the way.
    assert_eq!(record.coins, threads * per_thread + 200);
}

#[test]
fn players_progress_independently_in_parallel() {
    let engine = ClickerEngine::new(
        MemoryStore::new(),
        FixedClock::new(0),
        FixedRoll::never_crit(),
    );

    thread::scope(|scope| {
        for id in 0..6 {
            let engine = &engine;
            scope.spawn(move || {
                let identity = PlayerIdentity::anonymous(id.to_string());
                for _ in 0..=id * 10 {
                    engine.perform_action(&identity).unwrap();
                }
            });
        }
    });

    let ranking = engine.rank().unwrap();
    assert_eq!(ranking.len(), 6);
    let coins: Vec<u64> = ranking.iter().map(|entry| entry.record.coins).collect();
    assert_eq!(coins, vec![51, 41, 31, 21, 11, 1]);
}

#[test]
fn legacy_saves_load_and_repair() {
    let records: std::collections::BTreeMap<String, PlayerRecord> =
        serde_json::from_str(LEGACY_SAVE).unwrap();
    let engine = ClickerEngine::new(
        MemoryStore::with_records(records),
        FixedClock::new(1_700_000_000),
        FixedRoll::never_crit(),
    );

    let larry = engine.player("1001").unwrap();
    assert_eq!(larry.coins, 12_500);
    assert_eq!(larry.character_levels.as_slice(), &[10, 4, 0, 0, 0, 0, 0]);
    assert_eq!(larry.boost_active_until, 1_700_000_123);
    assert_eq!(larry.created_at, 1_699_990_000);
    assert!(larry.has_achievement("first_max_char"));

    let short = engine.player("1002").unwrap();
    assert_eq!(short.character_levels.len(), 7);
    assert_eq!(short.daily_streak, 0);

    // Legacy boost is still running at the engine clock.
    let action = engine
        .perform_action(&PlayerIdentity::new("1001", "Legacy Larry"))
        .unwrap();
    assert!(action.value.boost_active);
    assert_eq!(action.value.credited, 27 * 2);
}

#[test]
fn leaderboard_ranks_by_power_then_reports_viewer() {
    let engine = ClickerEngine::new(
        MemoryStore::new(),
        FixedClock::new(0),
        FixedRoll::always_crit(),
    );
    for (id, clicks) in [("a", 1), ("b", 3), ("c", 2)] {
        let identity = PlayerIdentity::anonymous(id);
        for _ in 0..clicks {
            engine.perform_action(&identity).unwrap();
        }
    }
    let view = engine.leaderboard(2, Some("a")).unwrap();
    assert_eq!(view.total_players, 3);
    assert_eq!(view.viewer_position, Some(3));
    let ids: Vec<&str> = view.entries.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

/// Counts writes and fails every one of them.
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryStore,
    attempts: AtomicUsize,
}

#[derive(Debug, thiserror::Error)]
#[error("store is read-only")]
struct ReadOnly;

impl PlayerStore for ReadOnlyStore {
    type Error = ReadOnly;

    fn load(&self, id: &str) -> Result<Option<PlayerRecord>, Self::Error> {
        Ok(self.inner.load(id).unwrap())
    }

    fn save(&self, _id: &str, _record: &PlayerRecord) -> Result<(), Self::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ReadOnly)
    }

    fn load_all(&self) -> Result<Vec<(String, PlayerRecord)>, Self::Error> {
        Ok(self.inner.load_all().unwrap())
    }
}

#[test]
fn save_failures_surface_as_warnings() {
    let store = ReadOnlyStore::default();
    let engine = ClickerEngine::new(&store, FixedClock::new(5), FixedRoll::never_crit());
    let identity = PlayerIdentity::new("ro", "ReadOnly");

    let committed = engine.perform_action(&identity).unwrap();
    assert!(!committed.is_persisted());
    assert_eq!(committed.record.coins, 1);
    assert_eq!(
        committed.warning,
        Some(EngineError::PersistenceFailure {
            player: "ro".into(),
            reason: "store is read-only".into(),
        })
    );
    assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(
        engine.player("ro"),
        Err(EngineError::UnknownPlayer("ro".into()))
    );
}

#[test]
fn refusal_reports_a_failed_first_contact_save() {
    let store = ReadOnlyStore::default();
    let engine = ClickerEngine::new(&store, FixedClock::new(5), FixedRoll::never_crit());

    let err = engine
        .purchase_boost(&PlayerIdentity::new("new", "Newcomer"))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::PersistenceFailure {
            player: "new".into(),
            reason: "store is read-only".into(),
        }
    );
    assert!(!err.is_domain());
    assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn refusal_of_a_known_player_skips_the_store() {
    let store = ReadOnlyStore {
        inner: MemoryStore::with_records([(
            "old".to_string(),
            PlayerRecord {
                display_name: "Veteran".into(),
                ..PlayerRecord::default()
            },
        )]),
        attempts: AtomicUsize::new(0),
    };
    let engine = ClickerEngine::new(&store, FixedClock::new(5), FixedRoll::never_crit());

    let err = engine
        .purchase_boost(&PlayerIdentity::new("old", "Veteran"))
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { .. }));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
}

/// Every read fails; counts write attempts.
#[derive(Default)]
struct UnreadableStore {
    attempts: AtomicUsize,
}

impl PlayerStore for UnreadableStore {
    type Error = std::io::Error;

    fn load(&self, _id: &str) -> Result<Option<PlayerRecord>, Self::Error> {
        Err(std::io::Error::other("disk unreadable"))
    }

    fn save(&self, _id: &str, _record: &PlayerRecord) -> Result<(), Self::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<(String, PlayerRecord)>, Self::Error> {
        Err(std::io::Error::other("disk unreadable"))
    }
}

#[test]
fn load_failures_refuse_without_writing() {
    let store = UnreadableStore::default();
    let engine = ClickerEngine::new(&store, FixedClock::new(5), FixedRoll::never_crit());
    let identity = PlayerIdentity::new("lost", "Lost");

    let err = engine.perform_action(&identity).unwrap_err();
    assert_eq!(
        err,
        EngineError::PersistenceFailure {
            player: "lost".into(),
            reason: "disk unreadable".into(),
        }
    );
    assert!(matches!(
        engine.claim_daily(&identity),
        Err(EngineError::PersistenceFailure { .. })
    ));
    assert!(matches!(
        engine.player("lost"),
        Err(EngineError::PersistenceFailure { .. })
    ));
    assert_eq!(
        engine.rank().unwrap_err(),
        EngineError::PersistenceFailure {
            player: "*".into(),
            reason: "disk unreadable".into(),
        }
    );
    assert!(engine.leaderboard(10, Some("lost")).is_err());
    assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
}

#[test]
fn renamed_player_is_refreshed_on_contact() {
    let engine = ClickerEngine::new(
        MemoryStore::new(),
        FixedClock::new(5),
        FixedRoll::never_crit(),
    );
    engine
        .get_or_create_record(&PlayerIdentity::new("n", "Before"))
        .unwrap();
    let after = engine
        .status(&PlayerIdentity::new("n", "After"))
        .unwrap()
        .value;
    assert_eq!(after.display_name, "After");
    assert_eq!(after.created_at, 5);
    assert_eq!(engine.player("n").unwrap().display_name, "After");
}
