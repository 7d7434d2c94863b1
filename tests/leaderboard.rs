use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

use lane_runner::highscores::{HighScoreEntry, Leaderboard, MAX_HIGH_SCORES};
use lane_runner::persistence::{Edit, FileStore, KeyValueStore, MemoryStore, PersistenceError};

fn entry(name: &str, score: u64) -> HighScoreEntry {
    HighScoreEntry {
        player_name: name.to_string(),
        score,
        coins: (score / 10) as u32,
        game_mode: "button_fast".to_string(),
        timestamp: 1_700_000_000_000 + score,
        latitude: Some(31.7683),
        longitude: Some(35.2137),
    }
}

fn scratch_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lane-runner-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("scores.json")
}

/// Reads work, every write fails
struct ReadOnlyStore(MemoryStore);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.0.get(key)
    }

    fn update(&self, _key: &str, _edit: &mut Edit<'_>) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("read-only".into()))
    }
}

#[test]
fn ranking_survives_reopen() {
    let path = scratch_file("reopen");
    let board = Leaderboard::new(FileStore::new(&path));
    for (name, score) in [("first", 50), ("second", 80), ("third", 30), ("fourth", 80)] {
        board.submit(entry(name, score)).unwrap();
    }
    let written = board.entries();
    let order: Vec<_> = written.iter().map(|e| (e.player_name.as_str(), e.score)).collect();
    assert_eq!(order, [("second", 80), ("fourth", 80), ("first", 50), ("third", 30)]);

    let reopened = Leaderboard::new(FileStore::new(&path));
    assert_eq!(reopened.entries(), written);
}

#[test]
fn eleventh_entry_keeps_ten() {
    let board = Leaderboard::new(MemoryStore::new());
    for score in 1..=10 {
        board.submit(entry(&format!("p{score}"), score * 10)).unwrap();
    }
    assert_eq!(board.submit(entry("low", 5)).unwrap(), None);
    assert_eq!(board.entries().len(), MAX_HIGH_SCORES);
    assert_eq!(board.entries().last().unwrap().score, 10);

    assert_eq!(board.submit(entry("mid", 55)).unwrap(), Some(6));
    let entries = board.entries();
    assert_eq!(entries.len(), MAX_HIGH_SCORES);
    assert_eq!(entries.last().unwrap().score, 20);
}

#[test]
fn observe_delivers_the_newest_commit() {
    let board = Leaderboard::new(MemoryStore::new());
    board.submit(entry("a", 10)).unwrap();

    let mut sub = board.observe();
    assert_eq!(sub.next().unwrap().len(), 1);

    board.submit(entry("b", 20)).unwrap();
    assert_eq!(sub.next().unwrap().iter().map(|e| e.score).collect::<Vec<_>>(), [20, 10]);

    board.clear().unwrap();
    board.submit(entry("c", 5)).unwrap();
    let snapshot = sub.next().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].player_name, "c");
    assert!(sub.try_next().is_none());
}

#[test]
fn observe_after_clear_is_empty() {
    let board = Leaderboard::new(MemoryStore::new());
    board.submit(entry("a", 10)).unwrap();
    board.clear().unwrap();
    assert_eq!(board.observe().next(), Some(Vec::new()));
}

#[test]
fn unread_subscription_holds_only_the_newest_snapshot() {
    let board = Leaderboard::new(MemoryStore::new());
    let sub = board.observe();
    for score in 1..=500 {
        board.submit(entry("x", score)).unwrap();
    }
    let latest = sub.try_next().unwrap();
    assert_eq!(latest.len(), MAX_HIGH_SCORES);
    assert_eq!(latest[0].score, 500);
    assert!(sub.try_next().is_none());
}

#[test]
fn waiting_reader_wakes_on_submit() {
    let board = Arc::new(Leaderboard::new(MemoryStore::new()));
    let mut sub = board.observe();
    assert_eq!(sub.next(), Some(Vec::new()));

    let writer = {
        let board = Arc::clone(&board);
        thread::spawn(move || board.submit(entry("late", 7)).unwrap())
    };
    let snapshot = sub.next().unwrap();
    assert_eq!(snapshot[0].player_name, "late");
    assert_eq!(writer.join().unwrap(), Some(1));
}

#[test]
fn subscription_ends_with_board() {
    let board = Leaderboard::new(MemoryStore::new());
    let mut sub = board.observe();
    assert!(sub.next().is_some());
    drop(board);
    assert!(sub.next().is_none());
}

#[test]
fn concurrent_submissions_lose_nothing() {
    let board = Arc::new(Leaderboard::new(MemoryStore::new()));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let board = Arc::clone(&board);
            thread::spawn(move || {
                for i in 0..5 {
                    board.submit(entry(&format!("t{t}-{i}"), t * 100 + i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let scores: Vec<u64> = board.entries().iter().map(|e| e.score).collect();
    assert_eq!(scores, [704, 703, 702, 701, 700, 604, 603, 602, 601, 600]);
}

#[test]
fn separate_file_stores_on_one_path_keep_every_submission() {
    let path = scratch_file("shared");
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2u64)
        .map(|t| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let board = Leaderboard::new(FileStore::new(&path));
                barrier.wait();
                for i in 0..4 {
                    board.submit(entry(&format!("t{t}-{i}"), 10 * t + i + 1)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let reopened = Leaderboard::new(FileStore::new(&path));
    let scores: Vec<u64> = reopened.entries().iter().map(|e| e.score).collect();
    assert_eq!(scores, [14, 13, 12, 11, 4, 3, 2, 1]);
}

#[test]
fn write_failure_is_reported_and_nothing_is_published() {
    let board = Leaderboard::new(ReadOnlyStore(MemoryStore::new()));
    let sub = board.observe();
    assert_eq!(sub.try_next(), Some(Vec::new()));

    let err = board.submit(entry("a", 1)).unwrap_err();
    assert!(matches!(err, PersistenceError::Unavailable(_)));
    assert!(board.clear().is_err());
    assert!(sub.try_next().is_none());
    assert!(board.entries().is_empty());
}

#[test]
fn corrupt_file_reads_as_empty_board() {
    let path = scratch_file("corrupt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"high_scores": "[{\"playerName\": 3}]"}"#).unwrap();

    let board = Leaderboard::new(FileStore::new(&path));
    assert!(board.entries().is_empty());
    assert_eq!(board.submit(entry("fresh", 1)).unwrap(), Some(1));
    assert_eq!(board.entries().len(), 1);
}
