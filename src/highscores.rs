//! High score leaderboard system
//!
//! Persisted under a single key of a [`KeyValueStore`], tracks top 10 scores.
//! Readers subscribe with [`Leaderboard::observe`] and receive the newest
//! ranked list after every committed change.

use std::sync::{Arc, Condvar, Mutex};

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, PersistenceError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Placeholder coordinates (Tel Aviv, Haifa, Jerusalem, Eilat, Be'er Sheva)
/// handed out until a real location provider is wired in
pub const PLACEHOLDER_LOCATIONS: [(f64, f64); 5] = [
    (32.0853, 34.7818),
    (32.7940, 34.9896),
    (31.7683, 35.2137),
    (29.5581, 34.9482),
    (31.2520, 34.7915),
];

/// Location to tag a new entry with, rotating by the current board size
pub fn placeholder_location(existing_entries: usize) -> (f64, f64) {
    PLACEHOLDER_LOCATIONS[existing_entries % PLACEHOLDER_LOCATIONS.len()]
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub player_name: String,
    /// Odometer at game over
    pub score: u64,
    pub coins: u32,
    /// Mode tag the run was played in
    pub game_mode: String,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Ranked list, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Decode a stored list. Anything unreadable is an empty board.
    pub fn decode(json: &str) -> Self {
        match serde_json::from_str::<HighScores>(json) {
            Ok(mut scores) => {
                scores.rank();
                scores
            }
            Err(e) => {
                log::warn!("Discarding unreadable high scores: {}", e);
                Self::new()
            }
        }
    }

    pub fn encode(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check if a score would make it onto the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Equal scores rank after existing ones, so the last entry must be beaten
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        let ahead = self.entries.iter().filter(|e| e.score >= score).count();
        (ahead < MAX_HIGH_SCORES).then_some(ahead + 1)
    }

    /// Add an entry, re-rank and trim.
    ///
    /// The sort is stable and the new entry goes in last, so it ranks after
    /// every existing entry with the same score. Returns the rank achieved
    /// (1-indexed) or None if it fell off the board.
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score);
        self.entries.push(entry);
        self.rank();
        rank
    }

    /// Stable sort by score descending, then trim to max size
    fn rank(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Persisted leaderboard with change notifications.
///
/// Writes are read-modify-write on the store and are serialized together
/// with their notifications, so subscribers never see an older snapshot
/// after a newer one.
pub struct Leaderboard<S> {
    store: S,
    subscribers: Mutex<Vec<Arc<Slot>>>,
}

impl<S: KeyValueStore> Leaderboard<S> {
    /// Store key holding the encoded list
    pub const STORAGE_KEY: &'static str = "high_scores";

    pub fn new(store: S) -> Self {
        Self {
            store,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current ranked list. Missing or unreadable data reads as empty.
    pub fn scores(&self) -> HighScores {
        match self.store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => HighScores::decode(&json),
            Ok(None) => HighScores::new(),
            Err(e) => {
                log::warn!("High scores unavailable, showing none: {}", e);
                HighScores::new()
            }
        }
    }

    pub fn entries(&self) -> Vec<HighScoreEntry> {
        self.scores().entries
    }

    /// Record a finished run.
    ///
    /// Returns the rank achieved (1-indexed), or None if the entry didn't make
    /// the top 10. Write failures are returned, never retried.
    pub fn submit(&self, entry: HighScoreEntry) -> Result<Option<usize>, PersistenceError> {
        let mut subscribers = self.subscribers.lock().map_err(|_| persistence::poisoned())?;

        let mut rank = None;
        let mut committed = HighScores::new();
        let mut pending = Some(entry);
        self.store.update(Self::STORAGE_KEY, &mut |current| {
            let mut scores = current.map(HighScores::decode).unwrap_or_default();
            if let Some(entry) = pending.take() {
                rank = scores.add(entry);
            }
            let json = scores.encode()?;
            committed = scores;
            Ok(Some(json))
        })?;

        match rank {
            Some(rank) => log::info!("High score saved at rank {rank}"),
            None => log::info!("Score did not reach the top {MAX_HIGH_SCORES}"),
        }
        Self::notify(&mut subscribers, &committed.entries);
        Ok(rank)
    }

    /// Remove every entry
    pub fn clear(&self) -> Result<(), PersistenceError> {
        let mut subscribers = self.subscribers.lock().map_err(|_| persistence::poisoned())?;
        self.store.update(Self::STORAGE_KEY, &mut |_| Ok(None))?;
        log::info!("High scores cleared");
        Self::notify(&mut subscribers, &[]);
        Ok(())
    }

    /// Subscribe to the ranked list.
    ///
    /// The current list is delivered immediately, then again after every
    /// successful `submit` or `clear`. A subscriber holds at most one pending
    /// snapshot: a reader that falls behind skips straight to the newest.
    pub fn observe(&self) -> Subscription {
        let slot = Arc::new(Slot::default());
        match self.subscribers.lock() {
            Ok(mut subscribers) => {
                // Read under the lock so no commit slips between snapshot and registration
                slot.publish(self.entries());
                subscribers.push(Arc::clone(&slot));
            }
            Err(_) => {
                log::warn!("Leaderboard subscriber list poisoned, subscription will not update");
                slot.publish(self.entries());
                slot.close();
            }
        }
        Subscription { slot }
    }

    fn notify(subscribers: &mut Vec<Arc<Slot>>, entries: &[HighScoreEntry]) {
        // Subscriptions that were dropped only have our reference left
        subscribers.retain(|slot| Arc::strong_count(slot) > 1);
        for slot in subscribers.iter() {
            slot.publish(entries.to_vec());
        }
    }
}

impl<S> Drop for Leaderboard<S> {
    fn drop(&mut self) {
        let subscribers = match self.subscribers.get_mut() {
            Ok(subscribers) => subscribers,
            Err(poisoned) => poisoned.into_inner(),
        };
        for slot in subscribers.drain(..) {
            slot.close();
        }
    }
}

#[derive(Debug, Default)]
struct SlotState {
    pending: Option<Vec<HighScoreEntry>>,
    closed: bool,
}

/// Single-value mailbox shared by a [`Leaderboard`] and one [`Subscription`]
#[derive(Debug, Default)]
struct Slot {
    state: Mutex<SlotState>,
    changed: Condvar,
}

impl Slot {
    /// Replace whatever is pending with `entries`
    fn publish(&self, entries: Vec<HighScoreEntry>) {
        if let Ok(mut state) = self.state.lock() {
            state.pending = Some(entries);
            self.changed.notify_all();
        }
    }

    fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed = true;
            self.changed.notify_all();
        }
    }
}

/// Stream of ranked snapshots from [`Leaderboard::observe`].
///
/// Iterating blocks until the next change and yields the newest committed
/// list; the stream ends once the leaderboard is dropped and the last
/// pending snapshot has been read.
#[derive(Debug)]
pub struct Subscription {
    slot: Arc<Slot>,
}

impl Subscription {
    /// Newest snapshot if one arrived since the last read
    pub fn try_next(&self) -> Option<Vec<HighScoreEntry>> {
        let mut state = self.slot.state.lock().ok()?;
        state.pending.take()
    }
}

impl Iterator for Subscription {
    type Item = Vec<HighScoreEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = self.slot.state.lock().ok()?;
        loop {
            if let Some(entries) = state.pending.take() {
                return Some(entries);
            }
            if state.closed {
                return None;
            }
            state = self.slot.changed.wait(state).ok()?;
        }
    }
}

/// Format a timestamp as a relative date string
pub fn format_date(timestamp: u64, now: u64) -> String {
    let diff_mins = now.saturating_sub(timestamp) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days >= 1 {
        if diff_days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", diff_days)
        }
    } else if diff_hours >= 1 {
        if diff_hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", diff_hours)
        }
    } else if diff_mins >= 1 {
        if diff_mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", diff_mins)
        }
    } else {
        "Just now".to_string()
    }
}
